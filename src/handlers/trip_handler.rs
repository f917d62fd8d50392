// src/handlers/trip_handler.rs
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use std::sync::Arc;

use crate::errors::{FleetError, FleetResult};
use crate::models::trip::{
    CreateTripRequest, EndTripRequest, TelemetryUpdate, TripDetailsUpdate, TripResponse,
};
use crate::services::trip_service::TripOperations;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ManagerScope {
    pub manager_id: String,
}

pub async fn create_trip(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTripRequest>,
) -> FleetResult<(StatusCode, Json<TripResponse>)> {
    let trip = state.trip_service.create_trip(request).await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

pub async fn get_trip(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
) -> FleetResult<Json<TripResponse>> {
    let trip = state
        .trip_service
        .get_trip(&trip_id)
        .await?
        .ok_or_else(|| FleetError::trip_not_found(&trip_id))?;
    Ok(Json(trip))
}

pub async fn start_trip(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
) -> FleetResult<Json<TripResponse>> {
    Ok(Json(state.trip_service.start_trip(&trip_id).await?))
}

pub async fn record_telemetry(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
    Json(update): Json<TelemetryUpdate>,
) -> FleetResult<Json<TripResponse>> {
    Ok(Json(
        state.trip_service.record_telemetry(&trip_id, update).await?,
    ))
}

pub async fn end_trip(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
    Json(request): Json<EndTripRequest>,
) -> FleetResult<Json<TripResponse>> {
    Ok(Json(
        state
            .trip_service
            .end_trip(&trip_id, request.final_mileage)
            .await?,
    ))
}

pub async fn modify_trip(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
    Json(update): Json<TripDetailsUpdate>,
) -> FleetResult<Json<TripResponse>> {
    Ok(Json(state.trip_service.modify_trip(&trip_id, update).await?))
}

pub async fn delete_trip(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
    Query(scope): Query<ManagerScope>,
) -> FleetResult<StatusCode> {
    state
        .trip_service
        .delete_trip(&trip_id, &scope.manager_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn manager_trips(
    State(state): State<Arc<AppState>>,
    Path(manager_id): Path<String>,
) -> FleetResult<Json<Vec<TripResponse>>> {
    Ok(Json(state.trip_service.manager_trips(&manager_id).await?))
}

pub async fn driver_open_trips(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
) -> FleetResult<Json<Vec<TripResponse>>> {
    Ok(Json(state.trip_service.driver_open_trips(&driver_id).await?))
}

pub async fn completed_trips_for_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> FleetResult<Json<Vec<TripResponse>>> {
    Ok(Json(
        state.trip_service.completed_trips_for_user(&user_id).await?,
    ))
}

pub async fn pending_trips(
    State(state): State<Arc<AppState>>,
    Path(manager_id): Path<String>,
) -> FleetResult<Json<Vec<TripResponse>>> {
    Ok(Json(state.trip_service.pending_trips(&manager_id).await?))
}

pub async fn trips_approaching_deadline(
    State(state): State<Arc<AppState>>,
    Path(manager_id): Path<String>,
) -> FleetResult<Json<Vec<TripResponse>>> {
    Ok(Json(
        state
            .trip_service
            .trips_approaching_deadline(&manager_id)
            .await?,
    ))
}
