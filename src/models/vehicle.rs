// src/models/vehicle.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum VehicleStatus {
    Available,
    #[serde(rename = "In Use")]
    InUse,
    #[serde(rename = "Under Maintenance")]
    UnderMaintenance,
}

/// Audit entry appended whenever a trip-end mileage report raises the
/// vehicle's odometer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MileageEntry {
    pub trip_id: String,
    pub recorded_at: DateTime<Utc>,
    pub previous_mileage: f64,
    pub reported_mileage: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Vehicle {
    pub id: String,
    pub manager_id: String,
    pub make: String,
    pub model: String,
    pub license_plate: String,
    pub status: VehicleStatus,
    // Monotonically non-decreasing; raised only by trip-end reports.
    pub mileage: f64,
    pub assigned_driver_id: Option<String>,
    pub inspection_passed: bool,
    pub service_dates: Vec<DateTime<Utc>>,
    pub next_service_mileage: Option<f64>,
    pub insurance_expiry: Option<DateTime<Utc>>,
    pub mileage_log: Vec<MileageEntry>,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn is_service_overdue(&self) -> bool {
        self.next_service_mileage
            .is_some_and(|threshold| self.mileage > threshold)
    }
}

// Request/Response Models
#[derive(Debug, Serialize, Deserialize)]
pub struct VehicleRegistration {
    pub manager_id: String,
    pub make: String,
    pub model: String,
    pub license_plate: String,
    pub mileage: f64,
    pub inspection_passed: bool,
    pub service_date: DateTime<Utc>,
    pub insurance_expiry: Option<DateTime<Utc>>,
    pub next_service_mileage: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VehicleResponse {
    pub id: String,
    pub manager_id: String,
    pub make: String,
    pub model: String,
    pub license_plate: String,
    pub status: VehicleStatus,
    pub mileage: f64,
    pub assigned_driver_id: Option<String>,
    pub inspection_passed: bool,
    pub service_dates: Vec<DateTime<Utc>>,
    pub next_service_mileage: Option<f64>,
    pub insurance_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            manager_id: vehicle.manager_id,
            make: vehicle.make,
            model: vehicle.model,
            license_plate: vehicle.license_plate,
            status: vehicle.status,
            mileage: vehicle.mileage,
            assigned_driver_id: vehicle.assigned_driver_id,
            inspection_passed: vehicle.inspection_passed,
            service_dates: vehicle.service_dates,
            next_service_mileage: vehicle.next_service_mileage,
            insurance_expiry: vehicle.insurance_expiry,
            created_at: vehicle.created_at,
        }
    }
}
