use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use fleettrack_realtime::{
    handlers::{
        account_handler, notification_handler, report_handler, trip_handler, vehicle_handler,
    },
    state::{AppConfig, AppState},
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();
    let app_state = Arc::new(AppState::new(config).unwrap());

    let app = Router::new()
        // Trip lifecycle
        .route("/trips", post(trip_handler::create_trip))
        .route(
            "/trips/:trip_id",
            get(trip_handler::get_trip)
                .put(trip_handler::modify_trip)
                .delete(trip_handler::delete_trip),
        )
        .route("/trips/:trip_id/start", post(trip_handler::start_trip))
        .route(
            "/trips/:trip_id/telemetry",
            put(trip_handler::record_telemetry),
        )
        .route("/trips/:trip_id/end", put(trip_handler::end_trip))
        // Trip listings
        .route(
            "/trips/manager/:manager_id",
            get(trip_handler::manager_trips),
        )
        .route(
            "/trips/driver/:driver_id",
            get(trip_handler::driver_open_trips),
        )
        .route(
            "/trips/completed/:user_id",
            get(trip_handler::completed_trips_for_user),
        )
        .route(
            "/trips/pending/:manager_id",
            get(trip_handler::pending_trips),
        )
        .route(
            "/trips/approaching-deadline/:manager_id",
            get(trip_handler::trips_approaching_deadline),
        )
        // Vehicles
        .route("/vehicles", post(vehicle_handler::register_vehicle))
        .route("/vehicles/:vehicle_id", get(vehicle_handler::get_vehicle))
        .route(
            "/vehicles/manager/:manager_id",
            get(vehicle_handler::vehicles_by_manager),
        )
        // Accounts
        .route("/drivers", post(account_handler::create_driver))
        .route("/managers", post(account_handler::create_manager))
        .route("/accounts/:account_id", get(account_handler::find_account))
        .route("/accounts", get(account_handler::find_account_by_email))
        .route(
            "/drivers/:driver_id/vehicle",
            post(account_handler::assign_vehicle).delete(account_handler::unassign_vehicle),
        )
        .route(
            "/drivers/manager/:manager_id",
            get(account_handler::drivers_by_manager),
        )
        .route(
            "/drivers/available/:manager_id",
            get(account_handler::available_drivers),
        )
        .route(
            "/drivers/unassigned",
            get(account_handler::unassigned_drivers),
        )
        // Reports
        .route(
            "/reports/manager/:manager_id/overview",
            get(report_handler::manager_overview),
        )
        .route(
            "/reports/manager/:manager_id/monthly-trips",
            get(report_handler::monthly_trip_stats),
        )
        .route(
            "/reports/manager/:manager_id/vehicle-usage",
            get(report_handler::vehicle_usage),
        )
        .route(
            "/reports/manager/:manager_id/driver-summary",
            get(report_handler::driver_summary),
        )
        .route(
            "/reports/manager/:manager_id/trip-summary",
            get(report_handler::trip_summary),
        )
        .route(
            "/reports/manager/:manager_id/harsh-events",
            get(report_handler::harsh_events),
        )
        .route(
            "/reports/manager/:manager_id/license-expiry",
            get(report_handler::license_expiry),
        )
        .route(
            "/reports/manager/:manager_id/insurance-expiry",
            get(report_handler::insurance_expiry),
        )
        .route(
            "/reports/manager/:manager_id/service-overdue",
            get(report_handler::service_overdue),
        )
        .route(
            "/reports/driver/:driver_id/performance",
            get(report_handler::driver_performance),
        )
        // Notifications
        .route(
            "/notifications/recipient/:recipient_id",
            get(notification_handler::list_notifications),
        )
        .route(
            "/notifications/:notification_id/read",
            put(notification_handler::mark_read),
        )
        .route(
            "/notifications/:notification_id",
            delete(notification_handler::delete_notification),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    tracing::info!("fleettrack-realtime listening on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
