pub mod account_service;
pub mod notification_service;
pub mod report_service;
pub mod telemetry;
pub mod trip_service;
pub mod vehicle_guard;
pub mod vehicle_service;
