// src/handlers/report_handler.rs
use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use std::sync::Arc;

use crate::errors::FleetResult;
use crate::models::driver::DriverResponse;
use crate::models::report::{
    DriverPerformance, DriverSummary, HarshEventReport, MonthlyTripCount, OverviewReport,
    TripSummary, VehicleUsage,
};
use crate::models::vehicle::VehicleResponse;
use crate::services::report_service::ReportOperations;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExpiryWindow {
    pub days: Option<i64>,
}

impl ExpiryWindow {
    fn days(&self) -> i64 {
        self.days.unwrap_or(30)
    }
}

pub async fn manager_overview(
    State(state): State<Arc<AppState>>,
    Path(manager_id): Path<String>,
) -> FleetResult<Json<OverviewReport>> {
    Ok(Json(state.report_service.manager_overview(&manager_id).await?))
}

pub async fn monthly_trip_stats(
    State(state): State<Arc<AppState>>,
    Path(manager_id): Path<String>,
) -> FleetResult<Json<Vec<MonthlyTripCount>>> {
    Ok(Json(
        state.report_service.monthly_trip_stats(&manager_id).await?,
    ))
}

pub async fn vehicle_usage(
    State(state): State<Arc<AppState>>,
    Path(manager_id): Path<String>,
) -> FleetResult<Json<Vec<VehicleUsage>>> {
    Ok(Json(state.report_service.vehicle_usage(&manager_id).await?))
}

pub async fn driver_summary(
    State(state): State<Arc<AppState>>,
    Path(manager_id): Path<String>,
) -> FleetResult<Json<Vec<DriverSummary>>> {
    Ok(Json(state.report_service.driver_summary(&manager_id).await?))
}

pub async fn driver_performance(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
) -> FleetResult<Json<DriverPerformance>> {
    Ok(Json(
        state.report_service.driver_performance(&driver_id).await?,
    ))
}

pub async fn trip_summary(
    State(state): State<Arc<AppState>>,
    Path(manager_id): Path<String>,
) -> FleetResult<Json<TripSummary>> {
    Ok(Json(state.report_service.trip_summary(&manager_id).await?))
}

pub async fn harsh_events(
    State(state): State<Arc<AppState>>,
    Path(manager_id): Path<String>,
) -> FleetResult<Json<Vec<HarshEventReport>>> {
    Ok(Json(state.report_service.harsh_events(&manager_id).await?))
}

pub async fn license_expiry(
    State(state): State<Arc<AppState>>,
    Path(manager_id): Path<String>,
    Query(window): Query<ExpiryWindow>,
) -> FleetResult<Json<Vec<DriverResponse>>> {
    Ok(Json(
        state
            .report_service
            .drivers_with_expiring_licenses(&manager_id, window.days())
            .await?,
    ))
}

pub async fn insurance_expiry(
    State(state): State<Arc<AppState>>,
    Path(manager_id): Path<String>,
    Query(window): Query<ExpiryWindow>,
) -> FleetResult<Json<Vec<VehicleResponse>>> {
    Ok(Json(
        state
            .report_service
            .vehicles_with_expiring_insurance(&manager_id, window.days())
            .await?,
    ))
}

pub async fn service_overdue(
    State(state): State<Arc<AppState>>,
    Path(manager_id): Path<String>,
) -> FleetResult<Json<Vec<VehicleResponse>>> {
    Ok(Json(
        state.report_service.service_overdue_vehicles(&manager_id).await?,
    ))
}
