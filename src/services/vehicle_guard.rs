// src/services/vehicle_guard.rs
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing;

use crate::errors::{FleetError, FleetResult};
use crate::models::vehicle::{MileageEntry, Vehicle, VehicleStatus};
use crate::store::{DocumentStore, Keys, Snapshot};

/// Sole writer of vehicle occupancy. Trip transitions never touch
/// `Vehicle::status` directly; they go through `claim` and `release` so
/// two trips racing for one vehicle resolve against the stored record,
/// not against whatever each of them read earlier.
pub struct VehicleGuard {
    store: Arc<dyn DocumentStore>,
}

impl VehicleGuard {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Flip the vehicle to In Use. Fails with `VehicleInUse` if another
    /// trip holds it; the loser of a write race re-reads and re-checks.
    pub async fn claim(&self, vehicle_id: &str) -> FleetResult<Vehicle> {
        loop {
            let snapshot =
                Snapshot::<Vehicle>::load(self.store.as_ref(), &Keys::vehicle(vehicle_id))
                    .await?
                    .ok_or_else(|| FleetError::vehicle_not_found(vehicle_id))?;

            let mut vehicle = snapshot.doc.clone();
            if vehicle.status == VehicleStatus::InUse {
                return Err(FleetError::VehicleInUse(vehicle_id.to_string()));
            }

            vehicle.status = VehicleStatus::InUse;
            if snapshot.commit(self.store.as_ref(), &vehicle).await? {
                tracing::debug!("Vehicle claimed: {}", vehicle_id);
                return Ok(vehicle);
            }
        }
    }

    /// Flip the vehicle back to Available. Idempotent; releasing an
    /// already-available vehicle is a no-op.
    pub async fn release(&self, vehicle_id: &str) -> FleetResult<Vehicle> {
        loop {
            let snapshot =
                Snapshot::<Vehicle>::load(self.store.as_ref(), &Keys::vehicle(vehicle_id))
                    .await?
                    .ok_or_else(|| FleetError::vehicle_not_found(vehicle_id))?;

            let mut vehicle = snapshot.doc.clone();
            if vehicle.status == VehicleStatus::Available {
                return Ok(vehicle);
            }

            vehicle.status = VehicleStatus::Available;
            if snapshot.commit(self.store.as_ref(), &vehicle).await? {
                tracing::debug!("Vehicle released: {}", vehicle_id);
                return Ok(vehicle);
            }
        }
    }

    /// Apply a trip-end mileage report. Only a strictly greater value
    /// raises the odometer and appends an audit entry; returns whether
    /// the report was applied.
    pub async fn record_mileage(
        &self,
        vehicle_id: &str,
        trip_id: &str,
        reported: f64,
        recorded_at: DateTime<Utc>,
    ) -> FleetResult<bool> {
        loop {
            let snapshot =
                Snapshot::<Vehicle>::load(self.store.as_ref(), &Keys::vehicle(vehicle_id))
                    .await?
                    .ok_or_else(|| FleetError::vehicle_not_found(vehicle_id))?;

            let mut vehicle = snapshot.doc.clone();
            if reported <= vehicle.mileage {
                tracing::debug!(
                    "Mileage report {} for vehicle {} does not exceed current {}, ignoring",
                    reported,
                    vehicle_id,
                    vehicle.mileage
                );
                return Ok(false);
            }

            vehicle.mileage_log.push(MileageEntry {
                trip_id: trip_id.to_string(),
                recorded_at,
                previous_mileage: vehicle.mileage,
                reported_mileage: reported,
            });
            vehicle.mileage = reported;

            if snapshot.commit(self.store.as_ref(), &vehicle).await? {
                tracing::info!("Vehicle {} mileage updated to {}", vehicle_id, reported);
                return Ok(true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, get_doc, put_doc};
    use chrono::TimeZone;

    fn vehicle(id: &str) -> Vehicle {
        Vehicle {
            id: id.to_string(),
            manager_id: "mgr-250801-aaaaa".to_string(),
            make: "Toyota".to_string(),
            model: "Hilux".to_string(),
            license_plate: "GR-1234-25".to_string(),
            status: VehicleStatus::Available,
            mileage: 1000.0,
            assigned_driver_id: None,
            inspection_passed: true,
            service_dates: Vec::new(),
            next_service_mileage: None,
            insurance_expiry: None,
            mileage_log: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap(),
        }
    }

    async fn seeded_guard(id: &str) -> (Arc<MemoryStore>, VehicleGuard) {
        let store = Arc::new(MemoryStore::new());
        put_doc(store.as_ref(), &Keys::vehicle(id), &vehicle(id))
            .await
            .unwrap();
        let guard = VehicleGuard::new(store.clone());
        (store, guard)
    }

    #[tokio::test]
    async fn test_claim_flips_status_and_rejects_second_claim() {
        let (store, guard) = seeded_guard("veh-250801-aaaaa").await;

        let claimed = guard.claim("veh-250801-aaaaa").await.unwrap();
        assert_eq!(claimed.status, VehicleStatus::InUse);

        let err = guard.claim("veh-250801-aaaaa").await.unwrap_err();
        assert!(matches!(err, FleetError::VehicleInUse(_)));

        let stored: Vehicle = get_doc(store.as_ref(), &Keys::vehicle("veh-250801-aaaaa"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, VehicleStatus::InUse);
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let (_store, guard) = seeded_guard("veh-250801-bbbbb").await;

        guard.claim("veh-250801-bbbbb").await.unwrap();
        let released = guard.release("veh-250801-bbbbb").await.unwrap();
        assert_eq!(released.status, VehicleStatus::Available);

        // Releasing again is a no-op, not an error
        let released = guard.release("veh-250801-bbbbb").await.unwrap();
        assert_eq!(released.status, VehicleStatus::Available);
    }

    #[tokio::test]
    async fn test_concurrent_claims_admit_exactly_one() {
        let (_store, guard) = seeded_guard("veh-250801-ccccc").await;
        let guard = Arc::new(guard);

        let first = {
            let guard = guard.clone();
            tokio::spawn(async move { guard.claim("veh-250801-ccccc").await })
        };
        let second = {
            let guard = guard.clone();
            tokio::spawn(async move { guard.claim("veh-250801-ccccc").await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(FleetError::VehicleInUse(_))))
        );
    }

    #[tokio::test]
    async fn test_mileage_never_regresses() {
        let (store, guard) = seeded_guard("veh-250801-ddddd").await;
        let at = Utc.with_ymd_and_hms(2025, 8, 2, 10, 0, 0).unwrap();

        // Lower and equal reports are ignored
        assert!(
            !guard
                .record_mileage("veh-250801-ddddd", "trp-250801-aaaaa", 900.0, at)
                .await
                .unwrap()
        );
        assert!(
            !guard
                .record_mileage("veh-250801-ddddd", "trp-250801-aaaaa", 1000.0, at)
                .await
                .unwrap()
        );

        // A strictly greater report lands with an audit entry
        assert!(
            guard
                .record_mileage("veh-250801-ddddd", "trp-250801-aaaaa", 1250.5, at)
                .await
                .unwrap()
        );

        let stored: Vehicle = get_doc(store.as_ref(), &Keys::vehicle("veh-250801-ddddd"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.mileage, 1250.5);
        assert_eq!(stored.mileage_log.len(), 1);
        assert_eq!(stored.mileage_log[0].previous_mileage, 1000.0);
        assert_eq!(stored.mileage_log[0].reported_mileage, 1250.5);
    }
}
