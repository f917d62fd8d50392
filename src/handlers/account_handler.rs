// src/handlers/account_handler.rs
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use std::sync::Arc;

use crate::errors::{FleetError, FleetResult};
use crate::models::account::Account;
use crate::models::driver::{DriverRegistration, DriverResponse};
use crate::models::manager::{Manager, ManagerRegistration};
use crate::services::account_service::AccountOperations;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VehicleAssignment {
    pub vehicle_id: String,
}

pub async fn create_driver(
    State(state): State<Arc<AppState>>,
    Json(registration): Json<DriverRegistration>,
) -> FleetResult<(StatusCode, Json<DriverResponse>)> {
    let driver = state.account_service.create_driver(registration).await?;
    Ok((StatusCode::CREATED, Json(driver)))
}

pub async fn create_manager(
    State(state): State<Arc<AppState>>,
    Json(registration): Json<ManagerRegistration>,
) -> FleetResult<(StatusCode, Json<Manager>)> {
    let manager = state.account_service.create_manager(registration).await?;
    Ok((StatusCode::CREATED, Json(manager)))
}

pub async fn find_account(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<String>,
) -> FleetResult<Json<Account>> {
    let account = state
        .account_service
        .find_by_id(&account_id)
        .await?
        .ok_or_else(|| FleetError::bad_request(format!("Unknown account: {}", account_id)))?;
    Ok(Json(account))
}

pub async fn find_account_by_email(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EmailQuery>,
) -> FleetResult<Json<Account>> {
    let account = state
        .account_service
        .find_by_email(&query.email)
        .await?
        .ok_or_else(|| FleetError::bad_request(format!("Unknown account: {}", query.email)))?;
    Ok(Json(account))
}

pub async fn assign_vehicle(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    Json(assignment): Json<VehicleAssignment>,
) -> FleetResult<Json<DriverResponse>> {
    Ok(Json(
        state
            .account_service
            .assign_vehicle(&driver_id, &assignment.vehicle_id)
            .await?,
    ))
}

pub async fn unassign_vehicle(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
) -> FleetResult<Json<DriverResponse>> {
    Ok(Json(state.account_service.unassign_vehicle(&driver_id).await?))
}

pub async fn drivers_by_manager(
    State(state): State<Arc<AppState>>,
    Path(manager_id): Path<String>,
) -> FleetResult<Json<Vec<DriverResponse>>> {
    Ok(Json(
        state.account_service.drivers_by_manager(&manager_id).await?,
    ))
}

pub async fn available_drivers(
    State(state): State<Arc<AppState>>,
    Path(manager_id): Path<String>,
) -> FleetResult<Json<Vec<DriverResponse>>> {
    Ok(Json(
        state.account_service.available_drivers(&manager_id).await?,
    ))
}

pub async fn unassigned_drivers(
    State(state): State<Arc<AppState>>,
) -> FleetResult<Json<Vec<DriverResponse>>> {
    Ok(Json(state.account_service.unassigned_drivers().await?))
}
