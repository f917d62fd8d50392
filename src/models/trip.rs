// src/models/trip.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Pending,   // Created by a manager, waiting for the driver to start it
    Active,    // Driver is on the road, telemetry is being ingested
    Completed, // Terminal; the trip log is frozen
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Destination {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
}

impl Destination {
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// One timestamped position+speed report. Samples are append-only and
/// never reordered; a non-empty `event_type` marks a harsh-driving event.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpeedSample {
    pub timestamp: DateTime<Utc>,
    pub speed: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub event_type: Option<String>,
}

impl SpeedSample {
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    pub fn is_harsh_event(&self) -> bool {
        self.event_type.as_deref().is_some_and(|tag| !tag.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Trip {
    pub id: String,
    pub manager_id: String,
    pub driver_id: String,
    pub vehicle_id: String,
    pub status: TripStatus,

    pub start_location: GeoPoint,
    pub destination: Destination,
    // Latest reported position, not necessarily the destination.
    pub end_location: Option<GeoPoint>,
    pub deadline: Option<DateTime<Utc>>,

    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,

    // Running pairwise haversine sum over speed_logs; never recomputed
    // from scratch, never decreases.
    pub distance_traveled: f64,
    pub speed_logs: Vec<SpeedSample>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn harsh_event_count(&self) -> usize {
        self.speed_logs.iter().filter(|s| s.is_harsh_event()).count()
    }

    /// Duration in minutes for completed trips with both timestamps.
    pub fn duration_minutes(&self) -> Option<f64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => {
                Some((end - start).num_milliseconds() as f64 / 60_000.0)
            }
            _ => None,
        }
    }
}

// Request/Response Models
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTripRequest {
    pub manager_id: String,
    pub driver_id: String,
    pub vehicle_id: String,
    pub start_location: GeoPoint,
    pub destination: Destination,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TelemetryUpdate {
    pub speed: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub event_type: Option<String>,
}

/// Pending-only detail changes; all fields optional, absent means keep.
#[derive(Debug, Serialize, Deserialize)]
pub struct TripDetailsUpdate {
    pub manager_id: String,
    pub destination: Option<Destination>,
    pub deadline: Option<DateTime<Utc>>,
    pub driver_id: Option<String>,
    pub vehicle_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EndTripRequest {
    #[serde(default)]
    pub final_mileage: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TripResponse {
    pub id: String,
    pub manager_id: String,
    pub driver_id: String,
    pub vehicle_id: String,
    pub status: TripStatus,
    pub start_location: GeoPoint,
    pub destination: Destination,
    pub end_location: Option<GeoPoint>,
    pub deadline: Option<DateTime<Utc>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub distance_traveled: f64,
    pub sample_count: usize,
    pub harsh_event_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        Self {
            harsh_event_count: trip.harsh_event_count(),
            sample_count: trip.speed_logs.len(),
            id: trip.id,
            manager_id: trip.manager_id,
            driver_id: trip.driver_id,
            vehicle_id: trip.vehicle_id,
            status: trip.status,
            start_location: trip.start_location,
            destination: trip.destination,
            end_location: trip.end_location,
            deadline: trip.deadline,
            start_time: trip.start_time,
            end_time: trip.end_time,
            distance_traveled: trip.distance_traveled,
            created_at: trip.created_at,
        }
    }
}
