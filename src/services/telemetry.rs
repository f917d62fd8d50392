// src/services/telemetry.rs
use crate::errors::{FleetError, FleetResult};
use crate::models::trip::{SpeedSample, Trip, TripStatus};
use crate::utils::geo;

/// Append one telemetry sample to an active trip's log.
///
/// Adds the great-circle distance from the previous sample to
/// `distance_traveled`, pushes the sample, and moves `end_location` to the
/// sample's coordinates. Samples are taken in arrival order; out-of-order
/// or duplicate timestamps are kept as-is. On rejection the trip is left
/// untouched.
pub fn append_sample(trip: &mut Trip, sample: SpeedSample) -> FleetResult<()> {
    if trip.status != TripStatus::Active {
        return Err(FleetError::invalid_state(format!(
            "Trip {} is not active",
            trip.id
        )));
    }
    if sample.speed < 0.0 {
        return Err(FleetError::validation_error(
            "speed",
            "Speed must be non-negative",
        ));
    }

    if let Some(last) = trip.speed_logs.last() {
        trip.distance_traveled += geo::haversine_km(&last.point(), &sample.point());
    }
    trip.end_location = Some(sample.point());
    trip.speed_logs.push(sample);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trip::{Destination, GeoPoint};
    use chrono::{Duration, TimeZone, Utc};

    fn active_trip() -> Trip {
        let created = Utc.with_ymd_and_hms(2025, 8, 1, 8, 0, 0).unwrap();
        Trip {
            id: "trp-250801-aaaaa".to_string(),
            manager_id: "mgr-250801-aaaaa".to_string(),
            driver_id: "drv-250801-aaaaa".to_string(),
            vehicle_id: "veh-250801-aaaaa".to_string(),
            status: TripStatus::Active,
            start_location: GeoPoint {
                latitude: 0.0,
                longitude: 0.0,
            },
            destination: Destination {
                latitude: 1.0,
                longitude: 1.0,
                address: None,
            },
            end_location: None,
            deadline: None,
            start_time: Some(created),
            end_time: None,
            distance_traveled: 0.0,
            speed_logs: Vec::new(),
            created_at: created,
            updated_at: created,
        }
    }

    fn sample(minute: i64, speed: f64, latitude: f64, longitude: f64) -> SpeedSample {
        SpeedSample {
            timestamp: Utc.with_ymd_and_hms(2025, 8, 1, 8, 0, 0).unwrap()
                + Duration::minutes(minute),
            speed,
            latitude,
            longitude,
            event_type: None,
        }
    }

    #[test]
    fn test_first_sample_adds_no_distance() {
        let mut trip = active_trip();
        append_sample(&mut trip, sample(0, 0.0, 0.0, 0.0)).unwrap();

        assert_eq!(trip.distance_traveled, 0.0);
        assert_eq!(trip.speed_logs.len(), 1);
        assert_eq!(
            trip.end_location,
            Some(GeoPoint {
                latitude: 0.0,
                longitude: 0.0
            })
        );
    }

    #[test]
    fn test_distance_is_pairwise_sum() {
        let mut trip = active_trip();
        append_sample(&mut trip, sample(0, 0.0, 0.0, 0.0)).unwrap();
        append_sample(&mut trip, sample(1, 50.0, 0.0, 1.0)).unwrap();
        append_sample(&mut trip, sample(2, 60.0, 0.0, 2.0)).unwrap();

        // Two one-degree legs along the equator
        assert!((trip.distance_traveled - 2.0 * 111.19).abs() < 0.02);
        assert_eq!(trip.speed_logs.len(), 3);
        assert_eq!(
            trip.end_location,
            Some(GeoPoint {
                latitude: 0.0,
                longitude: 2.0
            })
        );
    }

    #[test]
    fn test_out_of_order_timestamps_are_kept_as_received() {
        let mut trip = active_trip();
        append_sample(&mut trip, sample(5, 40.0, 0.0, 0.0)).unwrap();
        append_sample(&mut trip, sample(2, 45.0, 0.0, 1.0)).unwrap();

        assert_eq!(trip.speed_logs.len(), 2);
        assert!(trip.speed_logs[0].timestamp > trip.speed_logs[1].timestamp);
        assert!((trip.distance_traveled - 111.19).abs() < 0.01);
    }

    #[test]
    fn test_rejects_pending_trip_without_mutation() {
        let mut trip = active_trip();
        trip.status = TripStatus::Pending;

        let err = append_sample(&mut trip, sample(0, 30.0, 0.5, 0.5)).unwrap_err();
        assert!(matches!(err, FleetError::InvalidState(_)));
        assert!(trip.speed_logs.is_empty());
        assert_eq!(trip.distance_traveled, 0.0);
        assert_eq!(trip.end_location, None);
    }

    #[test]
    fn test_rejects_negative_speed_without_mutation() {
        let mut trip = active_trip();
        append_sample(&mut trip, sample(0, 0.0, 0.0, 0.0)).unwrap();

        let err = append_sample(&mut trip, sample(1, -3.0, 0.0, 1.0)).unwrap_err();
        assert!(matches!(err, FleetError::ValidationFailed(_)));
        assert_eq!(trip.speed_logs.len(), 1);
        assert_eq!(trip.distance_traveled, 0.0);
    }

    #[test]
    fn test_harsh_event_tagging() {
        let mut trip = active_trip();
        append_sample(&mut trip, sample(0, 0.0, 0.0, 0.0)).unwrap();

        let mut harsh = sample(1, 80.0, 0.1, 0.1);
        harsh.event_type = Some("hard_braking".to_string());
        append_sample(&mut trip, harsh).unwrap();

        let mut empty_tag = sample(2, 70.0, 0.2, 0.2);
        empty_tag.event_type = Some(String::new());
        append_sample(&mut trip, empty_tag).unwrap();

        assert_eq!(trip.harsh_event_count(), 1);
    }
}
