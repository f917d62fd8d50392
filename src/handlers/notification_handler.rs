// src/handlers/notification_handler.rs
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use std::sync::Arc;

use crate::errors::FleetResult;
use crate::models::notification::{Notification, RecipientType};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecipientFilter {
    #[serde(rename = "type")]
    pub recipient_type: Option<RecipientType>,
}

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Path(recipient_id): Path<String>,
    Query(filter): Query<RecipientFilter>,
) -> FleetResult<Json<Vec<Notification>>> {
    Ok(Json(
        state
            .notification_service
            .notifications_for(&recipient_id, filter.recipient_type)
            .await?,
    ))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(notification_id): Path<String>,
) -> FleetResult<Json<Notification>> {
    Ok(Json(
        state.notification_service.mark_read(&notification_id).await?,
    ))
}

pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Path(notification_id): Path<String>,
) -> FleetResult<StatusCode> {
    state.notification_service.delete(&notification_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
