// src/errors.rs
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::StoreError;

/// Main error type for the fleettrack-realtime service
#[derive(Debug)]
pub enum FleetError {
    // HTTP and API errors
    BadRequest(String),
    Forbidden(String),

    // Missing entities
    TripNotFound(String),
    DriverNotFound(String),
    VehicleNotFound(String),
    ManagerNotFound(String),
    NotificationNotFound(String),

    // Lifecycle and resource errors
    InvalidState(String),
    VehicleInUse(String),
    EmailTaken(String),

    // Validation errors
    ValidationFailed(Vec<ValidationError>),
    MissingRequiredField(String),

    // Persistence and serialization errors
    Store(String),
    Serialization(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl fmt::Display for FleetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FleetError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            FleetError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),

            FleetError::TripNotFound(id) => write!(f, "Trip not found: {}", id),
            FleetError::DriverNotFound(id) => write!(f, "Driver not found: {}", id),
            FleetError::VehicleNotFound(id) => write!(f, "Vehicle not found: {}", id),
            FleetError::ManagerNotFound(id) => write!(f, "Manager not found: {}", id),
            FleetError::NotificationNotFound(id) => {
                write!(f, "Notification not found: {}", id)
            }

            FleetError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            FleetError::VehicleInUse(id) => {
                write!(f, "Vehicle is already in use: {}", id)
            }
            FleetError::EmailTaken(email) => {
                write!(f, "Email already exists: {}", email)
            }

            FleetError::ValidationFailed(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            FleetError::MissingRequiredField(field) => {
                write!(f, "Missing required field: {}", field)
            }

            FleetError::Store(msg) => write!(f, "Store error: {}", msg),
            FleetError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for FleetError {}

impl IntoResponse for FleetError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            FleetError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            FleetError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),

            FleetError::TripNotFound(id) => (
                StatusCode::NOT_FOUND,
                "trip_not_found",
                format!("Trip not found: {}", id),
                None,
            ),
            FleetError::DriverNotFound(id) => (
                StatusCode::NOT_FOUND,
                "driver_not_found",
                format!("Driver not found: {}", id),
                None,
            ),
            FleetError::VehicleNotFound(id) => (
                StatusCode::NOT_FOUND,
                "vehicle_not_found",
                format!("Vehicle not found: {}", id),
                None,
            ),
            FleetError::ManagerNotFound(id) => (
                StatusCode::NOT_FOUND,
                "manager_not_found",
                format!("Manager not found: {}", id),
                None,
            ),
            FleetError::NotificationNotFound(id) => (
                StatusCode::NOT_FOUND,
                "notification_not_found",
                format!("Notification not found: {}", id),
                None,
            ),

            FleetError::InvalidState(msg) => (StatusCode::CONFLICT, "invalid_state", msg, None),
            FleetError::VehicleInUse(id) => (
                StatusCode::CONFLICT,
                "vehicle_in_use",
                format!("Vehicle is already in use: {}", id),
                None,
            ),
            FleetError::EmailTaken(email) => (
                StatusCode::CONFLICT,
                "email_taken",
                format!("Email already exists: {}", email),
                None,
            ),

            FleetError::ValidationFailed(errors) => {
                let details = serde_json::to_value(&errors).ok();
                (
                    StatusCode::BAD_REQUEST,
                    "validation_failed",
                    "Validation errors occurred".to_string(),
                    details,
                )
            }
            FleetError::MissingRequiredField(field) => (
                StatusCode::BAD_REQUEST,
                "missing_field",
                format!("Missing required field: {}", field),
                None,
            ),

            // Persistence problems are internal
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                self.to_string(),
                None,
            ),
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, axum::Json(error_response)).into_response()
    }
}

// Convenience type alias for Results
pub type FleetResult<T> = Result<T, FleetError>;

// Conversion implementations for common error types
impl From<StoreError> for FleetError {
    fn from(err: StoreError) -> Self {
        FleetError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for FleetError {
    fn from(err: serde_json::Error) -> Self {
        FleetError::Serialization(err.to_string())
    }
}

// Helper functions for creating common errors
impl FleetError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        FleetError::BadRequest(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        FleetError::Forbidden(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        FleetError::InvalidState(msg.into())
    }

    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        FleetError::ValidationFailed(vec![ValidationError {
            field: field.into(),
            message: message.into(),
        }])
    }

    pub fn trip_not_found(trip_id: impl Into<String>) -> Self {
        FleetError::TripNotFound(trip_id.into())
    }

    pub fn driver_not_found(driver_id: impl Into<String>) -> Self {
        FleetError::DriverNotFound(driver_id.into())
    }

    pub fn vehicle_not_found(vehicle_id: impl Into<String>) -> Self {
        FleetError::VehicleNotFound(vehicle_id.into())
    }

    pub fn manager_not_found(manager_id: impl Into<String>) -> Self {
        FleetError::ManagerNotFound(manager_id.into())
    }
}
