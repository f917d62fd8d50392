// src/services/report_service.rs
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing;

use crate::errors::FleetResult;
use crate::models::driver::{AccountStatus, Driver, DriverResponse};
use crate::models::report::{
    DriverPerformance, DriverSummary, HarshEventReport, MonthlyTripCount, OverviewReport,
    TripDigest, TripSummary, VehicleUsage,
};
use crate::models::trip::{Trip, TripStatus};
use crate::models::vehicle::{Vehicle, VehicleResponse, VehicleStatus};
use crate::store::{DocumentStore, Keys, get_doc};
use crate::utils::clock::Clock;

#[async_trait]
pub trait ReportOperations: Send + Sync {
    async fn manager_overview(&self, manager_id: &str) -> FleetResult<OverviewReport>;
    async fn monthly_trip_stats(&self, manager_id: &str) -> FleetResult<Vec<MonthlyTripCount>>;
    async fn vehicle_usage(&self, manager_id: &str) -> FleetResult<Vec<VehicleUsage>>;
    async fn driver_summary(&self, manager_id: &str) -> FleetResult<Vec<DriverSummary>>;
    async fn driver_performance(&self, driver_id: &str) -> FleetResult<DriverPerformance>;
    async fn trip_summary(&self, manager_id: &str) -> FleetResult<TripSummary>;
    async fn harsh_events(&self, manager_id: &str) -> FleetResult<Vec<HarshEventReport>>;
    async fn drivers_with_expiring_licenses(
        &self,
        manager_id: &str,
        days: i64,
    ) -> FleetResult<Vec<DriverResponse>>;
    async fn vehicles_with_expiring_insurance(
        &self,
        manager_id: &str,
        days: i64,
    ) -> FleetResult<Vec<VehicleResponse>>;
    async fn service_overdue_vehicles(&self, manager_id: &str)
    -> FleetResult<Vec<VehicleResponse>>;
}

/// Presentation rounding lives here, at the edge of the folds.
/// Accumulation stays full precision.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn digest(trip: &Trip) -> TripDigest {
    TripDigest {
        trip_id: trip.id.clone(),
        start_time: trip.start_time,
        end_time: trip.end_time,
        status: trip.status,
        distance_traveled: trip.distance_traveled,
    }
}

fn mean_speed(trips: &[&Trip]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for trip in trips {
        for log in &trip.speed_logs {
            sum += log.speed;
            count += 1;
        }
    }
    if count > 0 { sum / count as f64 } else { 0.0 }
}

/// Dashboard headline numbers. `trips` are expected oldest first; the
/// digest keeps the five most recent.
pub fn fold_overview(drivers: &[Driver], vehicles: &[Vehicle], trips: &[Trip]) -> OverviewReport {
    let total_distance: f64 = trips.iter().map(|t| t.distance_traveled).sum();
    let harsh_event_count = trips.iter().map(|t| t.harsh_event_count()).sum();

    OverviewReport {
        total_drivers: drivers
            .iter()
            .filter(|d| d.account_status == AccountStatus::Active)
            .count(),
        active_vehicles: vehicles
            .iter()
            .filter(|v| v.status == VehicleStatus::InUse)
            .count(),
        available_vehicles: vehicles
            .iter()
            .filter(|v| v.status == VehicleStatus::Available)
            .count(),
        total_trips: trips.len(),
        completed_trips: trips
            .iter()
            .filter(|t| t.status == TripStatus::Completed)
            .count(),
        pending_trips: trips
            .iter()
            .filter(|t| t.status == TripStatus::Pending)
            .count(),
        active_trips: trips
            .iter()
            .filter(|t| t.status == TripStatus::Active)
            .count(),
        total_distance: round2(total_distance),
        harsh_event_count,
        recent_trips: trips.iter().rev().take(5).rev().map(digest).collect(),
    }
}

/// Trips bucketed by the "%Y-%m" of their start time, ascending by key.
/// Trips that never started carry no bucket and are skipped.
pub fn fold_monthly_counts(trips: &[Trip]) -> Vec<MonthlyTripCount> {
    let mut buckets: BTreeMap<String, usize> = BTreeMap::new();
    for trip in trips {
        if let Some(start) = trip.start_time {
            *buckets.entry(start.format("%Y-%m").to_string()).or_default() += 1;
        }
    }
    buckets
        .into_iter()
        .map(|(month, trip_count)| MonthlyTripCount { month, trip_count })
        .collect()
}

/// Completed-trip usage per vehicle. Every vehicle appears, including
/// ones with no trips yet.
pub fn fold_vehicle_usage(vehicles: &[Vehicle], completed: &[Trip]) -> Vec<VehicleUsage> {
    vehicles
        .iter()
        .map(|vehicle| {
            let vehicle_trips: Vec<&Trip> = completed
                .iter()
                .filter(|t| t.vehicle_id == vehicle.id)
                .collect();
            let total_distance: f64 = vehicle_trips.iter().map(|t| t.distance_traveled).sum();

            VehicleUsage {
                vehicle_id: vehicle.id.clone(),
                make: vehicle.make.clone(),
                model: vehicle.model.clone(),
                license_plate: vehicle.license_plate.clone(),
                trip_count: vehicle_trips.len(),
                total_distance: round2(total_distance),
                average_speed: round2(mean_speed(&vehicle_trips)),
            }
        })
        .collect()
}

/// Per-driver accumulation over a manager's trips, ordered by driver id.
pub fn fold_driver_summary(trips: &[Trip], names: &BTreeMap<String, String>) -> Vec<DriverSummary> {
    let mut grouped: BTreeMap<&str, (usize, f64, usize)> = BTreeMap::new();
    for trip in trips {
        let entry = grouped.entry(&trip.driver_id).or_default();
        entry.0 += 1;
        entry.1 += trip.distance_traveled;
        entry.2 += trip.harsh_event_count();
    }

    grouped
        .into_iter()
        .map(|(driver_id, (trip_count, total_distance, harsh_events))| DriverSummary {
            driver_id: driver_id.to_string(),
            name: names.get(driver_id).cloned().unwrap_or_default(),
            trip_count,
            total_distance: round2(total_distance),
            harsh_events,
            avg_distance: round2(total_distance / trip_count as f64),
        })
        .collect()
}

/// One driver's record over their completed trips.
pub fn fold_driver_performance(completed: &[Trip]) -> DriverPerformance {
    let total_distance: f64 = completed.iter().map(|t| t.distance_traveled).sum();
    let refs: Vec<&Trip> = completed.iter().collect();

    DriverPerformance {
        trip_count: completed.len(),
        total_distance: round2(total_distance),
        average_speed: round2(mean_speed(&refs)),
        harsh_events: completed.iter().map(|t| t.harsh_event_count()).sum(),
        recent_trips: completed.iter().rev().take(5).rev().map(digest).collect(),
    }
}

/// Status counts plus average duration in minutes over completed trips
/// with both timestamps.
pub fn fold_trip_summary(trips: &[Trip]) -> TripSummary {
    let mut summary = TripSummary {
        pending: 0,
        active: 0,
        completed: 0,
        total_distance: 0.0,
        average_duration_minutes: 0.0,
    };

    let mut total_duration = 0.0;
    let mut timed_count = 0usize;
    for trip in trips {
        match trip.status {
            TripStatus::Pending => summary.pending += 1,
            TripStatus::Active => summary.active += 1,
            TripStatus::Completed => summary.completed += 1,
        }
        summary.total_distance += trip.distance_traveled;

        if trip.status == TripStatus::Completed {
            if let Some(minutes) = trip.duration_minutes() {
                total_duration += minutes;
                timed_count += 1;
            }
        }
    }

    summary.total_distance = round2(summary.total_distance);
    if timed_count > 0 {
        summary.average_duration_minutes = round2(total_duration / timed_count as f64);
    }
    summary
}

/// Harsh-driving counts with route endpoints, one row per completed trip.
pub fn fold_harsh_events(completed: &[Trip]) -> Vec<HarshEventReport> {
    completed
        .iter()
        .map(|trip| HarshEventReport {
            trip_id: trip.id.clone(),
            vehicle_id: trip.vehicle_id.clone(),
            harsh_event_count: trip.harsh_event_count(),
            start_location: trip.start_location,
            end_location: trip.end_location,
            start_time: trip.start_time,
            end_time: trip.end_time,
        })
        .collect()
}

/// Loads the inputs and hands them to the pure folds above.
pub struct ReportService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl ReportService {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    async fn manager_trip_set(&self, manager_id: &str) -> FleetResult<Vec<Trip>> {
        let ids = self.store.smembers(&Keys::manager_trips(manager_id)).await?;
        self.load_trips(ids).await
    }

    async fn load_trips(&self, ids: Vec<String>) -> FleetResult<Vec<Trip>> {
        let loads = ids.iter().map(|id| {
            let key = Keys::trip(id);
            async move { get_doc::<Trip>(self.store.as_ref(), &key).await }
        });
        let mut trips: Vec<Trip> = try_join_all(loads).await?.into_iter().flatten().collect();
        // Oldest first, so "recent" slices land on the tail
        trips.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(trips)
    }

    async fn manager_drivers(&self, manager_id: &str) -> FleetResult<Vec<Driver>> {
        let ids = self
            .store
            .smembers(&Keys::manager_drivers(manager_id))
            .await?;
        let loads = ids.iter().map(|id| {
            let key = Keys::driver(id);
            async move { get_doc::<Driver>(self.store.as_ref(), &key).await }
        });
        Ok(try_join_all(loads).await?.into_iter().flatten().collect())
    }

    async fn manager_vehicles(&self, manager_id: &str) -> FleetResult<Vec<Vehicle>> {
        let ids = self
            .store
            .smembers(&Keys::manager_vehicles(manager_id))
            .await?;
        let loads = ids.iter().map(|id| {
            let key = Keys::vehicle(id);
            async move { get_doc::<Vehicle>(self.store.as_ref(), &key).await }
        });
        Ok(try_join_all(loads).await?.into_iter().flatten().collect())
    }

    fn completed(trips: Vec<Trip>) -> Vec<Trip> {
        trips
            .into_iter()
            .filter(|t| t.status == TripStatus::Completed)
            .collect()
    }

    fn window_end(&self, days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = self.clock.now();
        (now, now + Duration::days(days))
    }
}

#[async_trait]
impl ReportOperations for ReportService {
    async fn manager_overview(&self, manager_id: &str) -> FleetResult<OverviewReport> {
        tracing::debug!("Building overview report for manager: {}", manager_id);

        let drivers = self.manager_drivers(manager_id).await?;
        let vehicles = self.manager_vehicles(manager_id).await?;
        let trips = self.manager_trip_set(manager_id).await?;
        Ok(fold_overview(&drivers, &vehicles, &trips))
    }

    async fn monthly_trip_stats(&self, manager_id: &str) -> FleetResult<Vec<MonthlyTripCount>> {
        tracing::debug!("Building monthly trip stats for manager: {}", manager_id);

        let trips = self.manager_trip_set(manager_id).await?;
        Ok(fold_monthly_counts(&trips))
    }

    async fn vehicle_usage(&self, manager_id: &str) -> FleetResult<Vec<VehicleUsage>> {
        tracing::debug!("Building vehicle usage report for manager: {}", manager_id);

        let vehicles = self.manager_vehicles(manager_id).await?;
        let completed = Self::completed(self.manager_trip_set(manager_id).await?);
        Ok(fold_vehicle_usage(&vehicles, &completed))
    }

    async fn driver_summary(&self, manager_id: &str) -> FleetResult<Vec<DriverSummary>> {
        tracing::debug!("Building driver summary for manager: {}", manager_id);

        let trips = self.manager_trip_set(manager_id).await?;
        let mut names = BTreeMap::new();
        for trip in &trips {
            if !names.contains_key(&trip.driver_id) {
                if let Some(driver) =
                    get_doc::<Driver>(self.store.as_ref(), &Keys::driver(&trip.driver_id)).await?
                {
                    names.insert(trip.driver_id.clone(), driver.name);
                }
            }
        }
        Ok(fold_driver_summary(&trips, &names))
    }

    async fn driver_performance(&self, driver_id: &str) -> FleetResult<DriverPerformance> {
        tracing::debug!("Building performance report for driver: {}", driver_id);

        let ids = self.store.smembers(&Keys::driver_trips(driver_id)).await?;
        let completed = Self::completed(self.load_trips(ids).await?);
        Ok(fold_driver_performance(&completed))
    }

    async fn trip_summary(&self, manager_id: &str) -> FleetResult<TripSummary> {
        tracing::debug!("Building trip summary for manager: {}", manager_id);

        let trips = self.manager_trip_set(manager_id).await?;
        Ok(fold_trip_summary(&trips))
    }

    async fn harsh_events(&self, manager_id: &str) -> FleetResult<Vec<HarshEventReport>> {
        tracing::debug!("Building harsh events report for manager: {}", manager_id);

        let completed = Self::completed(self.manager_trip_set(manager_id).await?);
        Ok(fold_harsh_events(&completed))
    }

    async fn drivers_with_expiring_licenses(
        &self,
        manager_id: &str,
        days: i64,
    ) -> FleetResult<Vec<DriverResponse>> {
        tracing::debug!(
            "Finding drivers with licenses expiring within {} days for manager: {}",
            days,
            manager_id
        );

        let (_, cutoff) = self.window_end(days);
        let drivers = self.manager_drivers(manager_id).await?;
        Ok(drivers
            .into_iter()
            .filter(|d| d.license_expiry.is_some_and(|expiry| expiry <= cutoff))
            .map(DriverResponse::from)
            .collect())
    }

    async fn vehicles_with_expiring_insurance(
        &self,
        manager_id: &str,
        days: i64,
    ) -> FleetResult<Vec<VehicleResponse>> {
        tracing::debug!(
            "Finding vehicles with insurance expiring within {} days for manager: {}",
            days,
            manager_id
        );

        let (now, cutoff) = self.window_end(days);
        let vehicles = self.manager_vehicles(manager_id).await?;
        Ok(vehicles
            .into_iter()
            .filter(|v| {
                v.insurance_expiry
                    .is_some_and(|expiry| expiry >= now && expiry <= cutoff)
            })
            .map(VehicleResponse::from)
            .collect())
    }

    async fn service_overdue_vehicles(
        &self,
        manager_id: &str,
    ) -> FleetResult<Vec<VehicleResponse>> {
        tracing::debug!("Finding service-overdue vehicles for manager: {}", manager_id);

        let vehicles = self.manager_vehicles(manager_id).await?;
        Ok(vehicles
            .into_iter()
            .filter(Vehicle::is_service_overdue)
            .map(VehicleResponse::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trip::{Destination, GeoPoint, SpeedSample};
    use chrono::TimeZone;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap()
    }

    fn trip(id: &str, driver_id: &str, vehicle_id: &str, status: TripStatus) -> Trip {
        Trip {
            id: id.to_string(),
            manager_id: "mgr-250610-aaaaa".to_string(),
            driver_id: driver_id.to_string(),
            vehicle_id: vehicle_id.to_string(),
            status,
            start_location: GeoPoint {
                latitude: 5.6,
                longitude: -0.18,
            },
            destination: Destination {
                latitude: 6.7,
                longitude: -1.62,
                address: None,
            },
            end_location: None,
            deadline: None,
            start_time: None,
            end_time: None,
            distance_traveled: 0.0,
            speed_logs: Vec::new(),
            created_at: base_time(),
            updated_at: base_time(),
        }
    }

    fn sample(speed: f64, event_type: Option<&str>) -> SpeedSample {
        SpeedSample {
            timestamp: base_time(),
            speed,
            latitude: 5.6,
            longitude: -0.18,
            event_type: event_type.map(str::to_string),
        }
    }

    fn vehicle(id: &str) -> Vehicle {
        Vehicle {
            id: id.to_string(),
            manager_id: "mgr-250610-aaaaa".to_string(),
            make: "Toyota".to_string(),
            model: "Hilux".to_string(),
            license_plate: "GR-1234-25".to_string(),
            status: VehicleStatus::Available,
            mileage: 0.0,
            assigned_driver_id: None,
            inspection_passed: true,
            service_dates: Vec::new(),
            next_service_mileage: None,
            insurance_expiry: None,
            mileage_log: Vec::new(),
            created_at: base_time(),
        }
    }

    #[test]
    fn test_folds_over_zero_trips_return_zeroes_not_nan() {
        let overview = fold_overview(&[], &[], &[]);
        assert_eq!(overview.total_trips, 0);
        assert_eq!(overview.total_distance, 0.0);
        assert!(overview.recent_trips.is_empty());

        let summary = fold_trip_summary(&[]);
        assert_eq!(summary.completed, 0);
        assert_eq!(summary.average_duration_minutes, 0.0);

        let performance = fold_driver_performance(&[]);
        assert_eq!(performance.trip_count, 0);
        assert_eq!(performance.average_speed, 0.0);
        assert_eq!(performance.total_distance, 0.0);

        assert!(fold_monthly_counts(&[]).is_empty());
        assert!(fold_driver_summary(&[], &BTreeMap::new()).is_empty());
        assert!(fold_harsh_events(&[]).is_empty());
    }

    #[test]
    fn test_vehicle_with_no_samples_has_zero_average_speed() {
        let vehicles = vec![vehicle("veh-250610-aaaaa")];
        let mut completed = trip(
            "trp-250610-aaaaa",
            "drv-250610-aaaaa",
            "veh-250610-aaaaa",
            TripStatus::Completed,
        );
        completed.distance_traveled = 42.424;

        let usage = fold_vehicle_usage(&vehicles, &[completed]);
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].trip_count, 1);
        assert_eq!(usage[0].total_distance, 42.42);
        assert_eq!(usage[0].average_speed, 0.0);
    }

    #[test]
    fn test_vehicle_usage_averages_speed_over_all_samples() {
        let vehicles = vec![vehicle("veh-250610-aaaaa"), vehicle("veh-250610-bbbbb")];

        let mut first = trip(
            "trp-250610-aaaaa",
            "drv-250610-aaaaa",
            "veh-250610-aaaaa",
            TripStatus::Completed,
        );
        first.speed_logs = vec![sample(40.0, None), sample(60.0, None)];
        let mut second = trip(
            "trp-250610-bbbbb",
            "drv-250610-aaaaa",
            "veh-250610-aaaaa",
            TripStatus::Completed,
        );
        second.speed_logs = vec![sample(20.0, None)];

        let usage = fold_vehicle_usage(&vehicles, &[first, second]);
        assert_eq!(usage[0].trip_count, 2);
        assert_eq!(usage[0].average_speed, 40.0);
        // The idle vehicle still shows up, zeroed
        assert_eq!(usage[1].trip_count, 0);
        assert_eq!(usage[1].average_speed, 0.0);
    }

    #[test]
    fn test_monthly_counts_bucket_and_sort_by_start_month() {
        let mut january = trip(
            "trp-250110-aaaaa",
            "drv-250610-aaaaa",
            "veh-250610-aaaaa",
            TripStatus::Completed,
        );
        january.start_time = Some(Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap());
        let mut march_a = trip(
            "trp-250305-aaaaa",
            "drv-250610-aaaaa",
            "veh-250610-aaaaa",
            TripStatus::Completed,
        );
        march_a.start_time = Some(Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap());
        let mut march_b = trip(
            "trp-250307-aaaaa",
            "drv-250610-aaaaa",
            "veh-250610-aaaaa",
            TripStatus::Active,
        );
        march_b.start_time = Some(Utc.with_ymd_and_hms(2025, 3, 7, 9, 0, 0).unwrap());
        // Never started, no bucket
        let pending = trip(
            "trp-250610-ppppp",
            "drv-250610-aaaaa",
            "veh-250610-aaaaa",
            TripStatus::Pending,
        );

        let counts = fold_monthly_counts(&[march_a, january, march_b, pending]);
        assert_eq!(
            counts,
            vec![
                MonthlyTripCount {
                    month: "2025-01".to_string(),
                    trip_count: 1
                },
                MonthlyTripCount {
                    month: "2025-03".to_string(),
                    trip_count: 2
                },
            ]
        );
    }

    #[test]
    fn test_driver_summary_accumulates_and_averages() {
        let mut names = BTreeMap::new();
        names.insert("drv-250610-aaaaa".to_string(), "Kofi".to_string());
        names.insert("drv-250610-bbbbb".to_string(), "Esi".to_string());

        let mut first = trip(
            "trp-250610-aaaaa",
            "drv-250610-aaaaa",
            "veh-250610-aaaaa",
            TripStatus::Completed,
        );
        first.distance_traveled = 100.0;
        first.speed_logs = vec![sample(50.0, Some("hard_braking")), sample(60.0, None)];
        let mut second = trip(
            "trp-250610-bbbbb",
            "drv-250610-aaaaa",
            "veh-250610-aaaaa",
            TripStatus::Completed,
        );
        second.distance_traveled = 50.5;
        let mut third = trip(
            "trp-250610-ccccc",
            "drv-250610-bbbbb",
            "veh-250610-aaaaa",
            TripStatus::Active,
        );
        third.distance_traveled = 10.0;

        let summaries = fold_driver_summary(&[first, second, third], &names);
        assert_eq!(summaries.len(), 2);

        assert_eq!(summaries[0].driver_id, "drv-250610-aaaaa");
        assert_eq!(summaries[0].name, "Kofi");
        assert_eq!(summaries[0].trip_count, 2);
        assert_eq!(summaries[0].total_distance, 150.5);
        assert_eq!(summaries[0].avg_distance, 75.25);
        assert_eq!(summaries[0].harsh_events, 1);

        assert_eq!(summaries[1].driver_id, "drv-250610-bbbbb");
        assert_eq!(summaries[1].trip_count, 1);
    }

    #[test]
    fn test_trip_summary_durations_over_completed_trips_only() {
        let mut done = trip(
            "trp-250610-aaaaa",
            "drv-250610-aaaaa",
            "veh-250610-aaaaa",
            TripStatus::Completed,
        );
        done.start_time = Some(base_time());
        done.end_time = Some(base_time() + Duration::minutes(90));
        done.distance_traveled = 60.0;

        // Completed but missing an end time, excluded from the average
        let mut untimed = trip(
            "trp-250610-bbbbb",
            "drv-250610-aaaaa",
            "veh-250610-aaaaa",
            TripStatus::Completed,
        );
        untimed.start_time = Some(base_time());

        let mut active = trip(
            "trp-250610-ccccc",
            "drv-250610-aaaaa",
            "veh-250610-aaaaa",
            TripStatus::Active,
        );
        active.start_time = Some(base_time());
        active.distance_traveled = 5.5;

        let summary = fold_trip_summary(&[done, untimed, active]);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.pending, 0);
        assert_eq!(summary.total_distance, 65.5);
        assert_eq!(summary.average_duration_minutes, 90.0);
    }

    #[test]
    fn test_overview_counts_and_recent_digest() {
        let drivers = vec![
            Driver {
                id: "drv-250610-aaaaa".to_string(),
                name: "Kofi".to_string(),
                email: "kofi@fleet.example".to_string(),
                account_status: AccountStatus::Active,
                is_assigned: false,
                assigned_vehicle_id: None,
                manager_id: None,
                license_expiry: None,
                created_at: base_time(),
            },
            Driver {
                id: "drv-250610-bbbbb".to_string(),
                name: "Esi".to_string(),
                email: "esi@fleet.example".to_string(),
                account_status: AccountStatus::Inactive,
                is_assigned: false,
                assigned_vehicle_id: None,
                manager_id: None,
                license_expiry: None,
                created_at: base_time(),
            },
        ];

        let mut in_use = vehicle("veh-250610-aaaaa");
        in_use.status = VehicleStatus::InUse;
        let vehicles = vec![in_use, vehicle("veh-250610-bbbbb")];

        let trips: Vec<Trip> = (0..7)
            .map(|i| {
                let mut t = trip(
                    &format!("trp-250610-aaa{:02}", i),
                    "drv-250610-aaaaa",
                    "veh-250610-aaaaa",
                    TripStatus::Completed,
                );
                t.created_at = base_time() + Duration::hours(i);
                t.distance_traveled = 10.0;
                t.speed_logs = vec![sample(30.0, Some("speeding"))];
                t
            })
            .collect();

        let overview = fold_overview(&drivers, &vehicles, &trips);
        assert_eq!(overview.total_drivers, 1); // inactive drivers excluded
        assert_eq!(overview.active_vehicles, 1);
        assert_eq!(overview.available_vehicles, 1);
        assert_eq!(overview.total_trips, 7);
        assert_eq!(overview.completed_trips, 7);
        assert_eq!(overview.total_distance, 70.0);
        assert_eq!(overview.harsh_event_count, 7);
        assert_eq!(overview.recent_trips.len(), 5);
        // The digest keeps the tail of the list
        assert_eq!(overview.recent_trips[4].trip_id, "trp-250610-aaa06");
    }

    #[test]
    fn test_harsh_events_one_row_per_completed_trip() {
        let mut with_events = trip(
            "trp-250610-aaaaa",
            "drv-250610-aaaaa",
            "veh-250610-aaaaa",
            TripStatus::Completed,
        );
        with_events.speed_logs = vec![
            sample(80.0, Some("hard_braking")),
            sample(70.0, Some("")),
            sample(60.0, None),
        ];
        with_events.end_location = Some(GeoPoint {
            latitude: 6.7,
            longitude: -1.62,
        });

        let clean = trip(
            "trp-250610-bbbbb",
            "drv-250610-aaaaa",
            "veh-250610-bbbbb",
            TripStatus::Completed,
        );

        let report = fold_harsh_events(&[with_events, clean]);
        assert_eq!(report.len(), 2);
        // An empty tag is not a harsh event
        assert_eq!(report[0].harsh_event_count, 1);
        assert_eq!(report[1].harsh_event_count, 0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(111.19492664455873), 111.19);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(0.0), 0.0);
    }
}
