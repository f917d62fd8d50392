// src/services/trip_service.rs
use async_trait::async_trait;
use chrono::Duration;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing;

use crate::errors::{FleetError, FleetResult};
use crate::models::driver::Driver;
use crate::models::notification::RecipientType;
use crate::models::trip::{
    CreateTripRequest, SpeedSample, TelemetryUpdate, Trip, TripDetailsUpdate, TripResponse,
    TripStatus,
};
use crate::models::vehicle::Vehicle;
use crate::services::notification_service::NotificationSink;
use crate::services::telemetry;
use crate::services::vehicle_guard::VehicleGuard;
use crate::store::{DocumentStore, Keys, Snapshot, get_doc, put_new};
use crate::utils::clock::Clock;
use crate::utils::id_generator::{IdGenerator, IdType, WithGeneratedId};

#[async_trait]
pub trait TripOperations: Send + Sync {
    async fn create_trip(&self, request: CreateTripRequest) -> FleetResult<TripResponse>;
    async fn start_trip(&self, trip_id: &str) -> FleetResult<TripResponse>;
    async fn record_telemetry(
        &self,
        trip_id: &str,
        update: TelemetryUpdate,
    ) -> FleetResult<TripResponse>;
    async fn end_trip(
        &self,
        trip_id: &str,
        final_mileage: Option<f64>,
    ) -> FleetResult<TripResponse>;
    async fn modify_trip(
        &self,
        trip_id: &str,
        update: TripDetailsUpdate,
    ) -> FleetResult<TripResponse>;
    async fn delete_trip(&self, trip_id: &str, manager_id: &str) -> FleetResult<()>;

    async fn get_trip(&self, trip_id: &str) -> FleetResult<Option<TripResponse>>;
    async fn manager_trips(&self, manager_id: &str) -> FleetResult<Vec<TripResponse>>;
    async fn driver_open_trips(&self, driver_id: &str) -> FleetResult<Vec<TripResponse>>;
    async fn completed_trips_for_user(&self, user_id: &str) -> FleetResult<Vec<TripResponse>>;
    async fn pending_trips(&self, manager_id: &str) -> FleetResult<Vec<TripResponse>>;
    async fn trips_approaching_deadline(
        &self,
        manager_id: &str,
    ) -> FleetResult<Vec<TripResponse>>;
}

/// Owns the pending -> active -> completed lifecycle. Every mutation is a
/// load, precondition check, commit loop against the stored record, so a
/// transition can never succeed against a state another writer already
/// replaced. Vehicle occupancy changes are routed through the guard.
pub struct TripService {
    store: Arc<dyn DocumentStore>,
    guard: Arc<VehicleGuard>,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl TripService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        guard: Arc<VehicleGuard>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            guard,
            sink,
            clock,
        }
    }

    async fn load_trip(&self, trip_id: &str) -> FleetResult<Snapshot<Trip>> {
        Snapshot::<Trip>::load(self.store.as_ref(), &Keys::trip(trip_id))
            .await?
            .ok_or_else(|| FleetError::trip_not_found(trip_id))
    }

    async fn require_driver(&self, driver_id: &str) -> FleetResult<Driver> {
        get_doc::<Driver>(self.store.as_ref(), &Keys::driver(driver_id))
            .await?
            .ok_or_else(|| FleetError::driver_not_found(driver_id))
    }

    async fn require_vehicle(&self, vehicle_id: &str) -> FleetResult<Vehicle> {
        get_doc::<Vehicle>(self.store.as_ref(), &Keys::vehicle(vehicle_id))
            .await?
            .ok_or_else(|| FleetError::vehicle_not_found(vehicle_id))
    }

    async fn load_trips(&self, ids: Vec<String>) -> FleetResult<Vec<Trip>> {
        let loads = ids.iter().map(|id| {
            let key = Keys::trip(id);
            async move { get_doc::<Trip>(self.store.as_ref(), &key).await }
        });
        let mut trips: Vec<Trip> = try_join_all(loads).await?.into_iter().flatten().collect();
        // Newest first
        trips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(trips)
    }

    fn to_responses(trips: Vec<Trip>) -> Vec<TripResponse> {
        trips.into_iter().map(TripResponse::from).collect()
    }
}

#[async_trait]
impl TripOperations for TripService {
    async fn create_trip(&self, request: CreateTripRequest) -> FleetResult<TripResponse> {
        tracing::info!("Creating trip for manager: {}", request.manager_id);

        if !IdGenerator::validate_id(&request.manager_id, Some(IdType::Manager)) {
            return Err(FleetError::validation_error(
                "manager_id",
                "Invalid manager ID format",
            ));
        }

        // Driver and vehicle must resolve; availability is checked at
        // Start, not here, so several pending trips may share a vehicle.
        self.require_driver(&request.driver_id).await?;
        self.require_vehicle(&request.vehicle_id).await?;

        let now = self.clock.now();
        let mut trip = Trip {
            id: String::new(), // Set by with_generated_id below
            manager_id: request.manager_id,
            driver_id: request.driver_id,
            vehicle_id: request.vehicle_id,
            status: TripStatus::Pending,
            start_location: request.start_location,
            destination: request.destination,
            end_location: None,
            deadline: request.deadline,
            start_time: None,
            end_time: None,
            distance_traveled: 0.0,
            speed_logs: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        trip.set_generated_id(IdType::Trip);

        if !put_new(self.store.as_ref(), &Keys::trip(&trip.id), &trip).await? {
            return Err(FleetError::Store(format!(
                "Trip id collision: {}",
                trip.id
            )));
        }
        self.store
            .sadd(&Keys::manager_trips(&trip.manager_id), &trip.id)
            .await?;
        self.store
            .sadd(&Keys::driver_trips(&trip.driver_id), &trip.id)
            .await?;

        tracing::info!("Trip created: {}", trip.id);
        Ok(trip.into())
    }

    async fn start_trip(&self, trip_id: &str) -> FleetResult<TripResponse> {
        tracing::info!("Starting trip: {}", trip_id);

        loop {
            let snapshot = self.load_trip(trip_id).await?;
            let mut trip = snapshot.doc.clone();

            if trip.status != TripStatus::Pending {
                return Err(FleetError::invalid_state(format!(
                    "Trip {} is already active or completed",
                    trip_id
                )));
            }

            // Claim before committing; a VehicleInUse rejection leaves the
            // trip pending and untouched.
            self.guard.claim(&trip.vehicle_id).await?;

            let now = self.clock.now();
            trip.status = TripStatus::Active;
            trip.start_time = Some(now);
            // Known origin for distance accumulation
            trip.speed_logs.push(SpeedSample {
                timestamp: now,
                speed: 0.0,
                latitude: trip.start_location.latitude,
                longitude: trip.start_location.longitude,
                event_type: None,
            });
            trip.updated_at = now;

            if snapshot.commit(self.store.as_ref(), &trip).await? {
                tracing::info!("Trip started: {}", trip_id);
                return Ok(trip.into());
            }

            // Lost the trip write race. Hand the vehicle back and
            // re-evaluate from the committed state.
            self.guard.release(&trip.vehicle_id).await?;
        }
    }

    async fn record_telemetry(
        &self,
        trip_id: &str,
        update: TelemetryUpdate,
    ) -> FleetResult<TripResponse> {
        tracing::debug!("Recording telemetry for trip: {}", trip_id);

        loop {
            let snapshot = self.load_trip(trip_id).await?;
            let mut trip = snapshot.doc.clone();

            let sample = SpeedSample {
                timestamp: self.clock.now(),
                speed: update.speed,
                latitude: update.latitude,
                longitude: update.longitude,
                event_type: update.event_type.clone(),
            };
            telemetry::append_sample(&mut trip, sample)?;
            trip.updated_at = self.clock.now();

            if snapshot.commit(self.store.as_ref(), &trip).await? {
                return Ok(trip.into());
            }
        }
    }

    async fn end_trip(
        &self,
        trip_id: &str,
        final_mileage: Option<f64>,
    ) -> FleetResult<TripResponse> {
        tracing::info!("Ending trip: {}", trip_id);

        let trip = loop {
            let snapshot = self.load_trip(trip_id).await?;
            let mut trip = snapshot.doc.clone();

            if trip.status != TripStatus::Active {
                return Err(FleetError::invalid_state(format!(
                    "Trip {} is not active",
                    trip_id
                )));
            }

            let now = self.clock.now();
            trip.status = TripStatus::Completed;
            trip.end_time = Some(now);
            trip.updated_at = now;

            if snapshot.commit(self.store.as_ref(), &trip).await? {
                break trip;
            }
        };

        // The vehicle comes back regardless of who ended the trip or
        // whether the mileage report below is accepted.
        self.guard.release(&trip.vehicle_id).await?;

        if let Some(reported) = final_mileage {
            let applied = self
                .guard
                .record_mileage(&trip.vehicle_id, &trip.id, reported, self.clock.now())
                .await?;
            if !applied {
                tracing::debug!(
                    "Final mileage {} for trip {} was not an increase, left unchanged",
                    reported,
                    trip.id
                );
            }
        }

        let message = format!(
            "Trip {} completed, {:.2} km traveled",
            trip.id, trip.distance_traveled
        );
        if let Err(err) = self
            .sink
            .notify(&trip.manager_id, RecipientType::Manager, &message)
            .await
        {
            tracing::warn!("Completion notification for trip {} failed: {}", trip.id, err);
        }

        tracing::info!("Trip ended: {}", trip_id);
        Ok(trip.into())
    }

    async fn modify_trip(
        &self,
        trip_id: &str,
        update: TripDetailsUpdate,
    ) -> FleetResult<TripResponse> {
        tracing::info!("Modifying trip: {}", trip_id);

        if let Some(driver_id) = &update.driver_id {
            self.require_driver(driver_id).await?;
        }
        if let Some(vehicle_id) = &update.vehicle_id {
            self.require_vehicle(vehicle_id).await?;
        }

        loop {
            let snapshot = self.load_trip(trip_id).await?;
            let mut trip = snapshot.doc.clone();

            if trip.manager_id != update.manager_id {
                return Err(FleetError::forbidden("Not the owning manager of this trip"));
            }
            if trip.status != TripStatus::Pending {
                return Err(FleetError::invalid_state(format!(
                    "Trip {} cannot be modified once it has started",
                    trip_id
                )));
            }

            let previous_driver = trip.driver_id.clone();
            if let Some(destination) = &update.destination {
                trip.destination = destination.clone();
            }
            if let Some(deadline) = update.deadline {
                trip.deadline = Some(deadline);
            }
            if let Some(driver_id) = &update.driver_id {
                trip.driver_id = driver_id.clone();
            }
            if let Some(vehicle_id) = &update.vehicle_id {
                trip.vehicle_id = vehicle_id.clone();
            }
            trip.updated_at = self.clock.now();

            if snapshot.commit(self.store.as_ref(), &trip).await? {
                if previous_driver != trip.driver_id {
                    self.store
                        .srem(&Keys::driver_trips(&previous_driver), &trip.id)
                        .await?;
                    self.store
                        .sadd(&Keys::driver_trips(&trip.driver_id), &trip.id)
                        .await?;
                }
                return Ok(trip.into());
            }
        }
    }

    async fn delete_trip(&self, trip_id: &str, manager_id: &str) -> FleetResult<()> {
        tracing::info!("Deleting trip: {}", trip_id);

        loop {
            let snapshot = self.load_trip(trip_id).await?;
            let trip = snapshot.doc.clone();

            if trip.manager_id != manager_id {
                return Err(FleetError::forbidden("Not the owning manager of this trip"));
            }
            if trip.status != TripStatus::Pending {
                return Err(FleetError::invalid_state(format!(
                    "Cannot delete trip {} once it has started",
                    trip_id
                )));
            }

            if snapshot.remove(self.store.as_ref()).await? {
                self.store
                    .srem(&Keys::manager_trips(&trip.manager_id), &trip.id)
                    .await?;
                self.store
                    .srem(&Keys::driver_trips(&trip.driver_id), &trip.id)
                    .await?;
                return Ok(());
            }
        }
    }

    async fn get_trip(&self, trip_id: &str) -> FleetResult<Option<TripResponse>> {
        if !IdGenerator::validate_id(trip_id, Some(IdType::Trip)) {
            tracing::warn!("Invalid trip ID format: {}", trip_id);
            return Ok(None);
        }

        tracing::debug!("Getting trip: {}", trip_id);
        let trip = get_doc::<Trip>(self.store.as_ref(), &Keys::trip(trip_id)).await?;
        Ok(trip.map(TripResponse::from))
    }

    async fn manager_trips(&self, manager_id: &str) -> FleetResult<Vec<TripResponse>> {
        tracing::debug!("Getting trips for manager: {}", manager_id);

        let ids = self.store.smembers(&Keys::manager_trips(manager_id)).await?;
        Ok(Self::to_responses(self.load_trips(ids).await?))
    }

    async fn driver_open_trips(&self, driver_id: &str) -> FleetResult<Vec<TripResponse>> {
        tracing::debug!("Getting open trips for driver: {}", driver_id);

        let ids = self.store.smembers(&Keys::driver_trips(driver_id)).await?;
        let trips = self.load_trips(ids).await?;
        Ok(Self::to_responses(
            trips
                .into_iter()
                .filter(|t| t.status != TripStatus::Completed)
                .collect(),
        ))
    }

    async fn completed_trips_for_user(&self, user_id: &str) -> FleetResult<Vec<TripResponse>> {
        tracing::debug!("Getting completed trips for user: {}", user_id);

        // The caller may be a driver or a manager; take the union of both
        // index sets.
        let mut ids = self.store.smembers(&Keys::driver_trips(user_id)).await?;
        ids.extend(self.store.smembers(&Keys::manager_trips(user_id)).await?);
        ids.sort();
        ids.dedup();

        let trips = self.load_trips(ids).await?;
        Ok(Self::to_responses(
            trips
                .into_iter()
                .filter(|t| t.status == TripStatus::Completed)
                .collect(),
        ))
    }

    async fn pending_trips(&self, manager_id: &str) -> FleetResult<Vec<TripResponse>> {
        tracing::debug!("Getting pending trips for manager: {}", manager_id);

        let ids = self.store.smembers(&Keys::manager_trips(manager_id)).await?;
        let trips = self.load_trips(ids).await?;
        Ok(Self::to_responses(
            trips
                .into_iter()
                .filter(|t| t.status == TripStatus::Pending)
                .collect(),
        ))
    }

    async fn trips_approaching_deadline(
        &self,
        manager_id: &str,
    ) -> FleetResult<Vec<TripResponse>> {
        tracing::debug!(
            "Getting trips approaching deadline for manager: {}",
            manager_id
        );

        let cutoff = self.clock.now() + Duration::hours(24);
        let ids = self.store.smembers(&Keys::manager_trips(manager_id)).await?;
        let trips = self.load_trips(ids).await?;
        Ok(Self::to_responses(
            trips
                .into_iter()
                .filter(|t| {
                    t.status == TripStatus::Active
                        && t.deadline.is_some_and(|deadline| deadline <= cutoff)
                })
                .collect(),
        ))
    }
}
