pub mod account_handler;
pub mod notification_handler;
pub mod report_handler;
pub mod trip_handler;
pub mod vehicle_handler;
