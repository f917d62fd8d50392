// src/models/report.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::trip::{GeoPoint, TripStatus};

/// Condensed trip line for "recent trips" sections.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TripDigest {
    pub trip_id: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: TripStatus,
    pub distance_traveled: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct OverviewReport {
    pub total_drivers: usize,
    pub active_vehicles: usize,
    pub available_vehicles: usize,
    pub total_trips: usize,
    pub completed_trips: usize,
    pub pending_trips: usize,
    pub active_trips: usize,
    pub total_distance: f64,
    pub harsh_event_count: usize,
    pub recent_trips: Vec<TripDigest>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MonthlyTripCount {
    pub month: String, // "%Y-%m" of the trip's start time
    pub trip_count: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct VehicleUsage {
    pub vehicle_id: String,
    pub make: String,
    pub model: String,
    pub license_plate: String,
    pub trip_count: usize,
    pub total_distance: f64,
    pub average_speed: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DriverSummary {
    pub driver_id: String,
    pub name: String,
    pub trip_count: usize,
    pub total_distance: f64,
    pub harsh_events: usize,
    pub avg_distance: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DriverPerformance {
    pub trip_count: usize,
    pub total_distance: f64,
    pub average_speed: f64,
    pub harsh_events: usize,
    pub recent_trips: Vec<TripDigest>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TripSummary {
    pub pending: usize,
    pub active: usize,
    pub completed: usize,
    pub total_distance: f64,
    pub average_duration_minutes: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HarshEventReport {
    pub trip_id: String,
    pub vehicle_id: String,
    pub harsh_event_count: usize,
    pub start_location: GeoPoint,
    pub end_location: Option<GeoPoint>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}
