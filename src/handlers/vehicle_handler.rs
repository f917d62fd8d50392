// src/handlers/vehicle_handler.rs
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use std::sync::Arc;

use crate::errors::{FleetError, FleetResult};
use crate::models::vehicle::{VehicleRegistration, VehicleResponse};
use crate::services::vehicle_service::VehicleOperations;
use crate::state::AppState;

pub async fn register_vehicle(
    State(state): State<Arc<AppState>>,
    Json(registration): Json<VehicleRegistration>,
) -> FleetResult<(StatusCode, Json<VehicleResponse>)> {
    let vehicle = state.vehicle_service.register_vehicle(registration).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

pub async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    Path(vehicle_id): Path<String>,
) -> FleetResult<Json<VehicleResponse>> {
    let vehicle = state
        .vehicle_service
        .get_vehicle(&vehicle_id)
        .await?
        .ok_or_else(|| FleetError::vehicle_not_found(&vehicle_id))?;
    Ok(Json(vehicle))
}

pub async fn vehicles_by_manager(
    State(state): State<Arc<AppState>>,
    Path(manager_id): Path<String>,
) -> FleetResult<Json<Vec<VehicleResponse>>> {
    Ok(Json(
        state.vehicle_service.vehicles_by_manager(&manager_id).await?,
    ))
}
