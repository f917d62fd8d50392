// src/models/driver.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub email: String,
    pub account_status: AccountStatus,
    // Derived from vehicle assignment, not from trip state.
    pub is_assigned: bool,
    pub assigned_vehicle_id: Option<String>,
    pub manager_id: Option<String>,
    pub license_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// Request/Response Models
#[derive(Debug, Serialize, Deserialize)]
pub struct DriverRegistration {
    pub name: String,
    pub email: String,
    pub manager_id: Option<String>,
    pub license_expiry: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DriverResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub account_status: AccountStatus,
    pub is_assigned: bool,
    pub assigned_vehicle_id: Option<String>,
    pub manager_id: Option<String>,
    pub license_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Driver> for DriverResponse {
    fn from(driver: Driver) -> Self {
        Self {
            id: driver.id,
            name: driver.name,
            email: driver.email,
            account_status: driver.account_status,
            is_assigned: driver.is_assigned,
            assigned_vehicle_id: driver.assigned_vehicle_id,
            manager_id: driver.manager_id,
            license_expiry: driver.license_expiry,
            created_at: driver.created_at,
        }
    }
}
