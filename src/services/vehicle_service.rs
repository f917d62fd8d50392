// src/services/vehicle_service.rs
use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing;

use crate::errors::{FleetError, FleetResult, ValidationError};
use crate::models::manager::Manager;
use crate::models::vehicle::{Vehicle, VehicleRegistration, VehicleResponse, VehicleStatus};
use crate::store::{DocumentStore, Keys, get_doc, put_new};
use crate::utils::clock::Clock;
use crate::utils::id_generator::{IdGenerator, IdType, WithGeneratedId};

#[async_trait]
pub trait VehicleOperations: Send + Sync {
    async fn register_vehicle(
        &self,
        registration: VehicleRegistration,
    ) -> FleetResult<VehicleResponse>;
    async fn get_vehicle(&self, vehicle_id: &str) -> FleetResult<Option<VehicleResponse>>;
    async fn vehicles_by_manager(&self, manager_id: &str) -> FleetResult<Vec<VehicleResponse>>;
}

pub struct VehicleService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl VehicleService {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn validate_registration(registration: &VehicleRegistration) -> FleetResult<()> {
        let mut errors = Vec::new();
        if registration.make.trim().is_empty() {
            errors.push(ValidationError {
                field: "make".to_string(),
                message: "Make is required".to_string(),
            });
        }
        if registration.model.trim().is_empty() {
            errors.push(ValidationError {
                field: "model".to_string(),
                message: "Model is required".to_string(),
            });
        }
        if registration.license_plate.trim().is_empty() {
            errors.push(ValidationError {
                field: "license_plate".to_string(),
                message: "License plate is required".to_string(),
            });
        }
        if registration.mileage < 0.0 {
            errors.push(ValidationError {
                field: "mileage".to_string(),
                message: "Mileage must be non-negative".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(FleetError::ValidationFailed(errors))
        }
    }
}

#[async_trait]
impl VehicleOperations for VehicleService {
    async fn register_vehicle(
        &self,
        registration: VehicleRegistration,
    ) -> FleetResult<VehicleResponse> {
        tracing::info!(
            "Registering vehicle for manager: {}",
            registration.manager_id
        );

        Self::validate_registration(&registration)?;
        get_doc::<Manager>(self.store.as_ref(), &Keys::manager(&registration.manager_id))
            .await?
            .ok_or_else(|| FleetError::manager_not_found(&registration.manager_id))?;

        let mut vehicle = Vehicle {
            id: String::new(), // Set by with_generated_id below
            manager_id: registration.manager_id,
            make: registration.make,
            model: registration.model,
            license_plate: registration.license_plate,
            status: VehicleStatus::Available,
            mileage: registration.mileage,
            assigned_driver_id: None,
            inspection_passed: registration.inspection_passed,
            service_dates: vec![registration.service_date],
            next_service_mileage: registration.next_service_mileage,
            insurance_expiry: registration.insurance_expiry,
            mileage_log: Vec::new(),
            created_at: self.clock.now(),
        };
        vehicle.set_generated_id(IdType::Vehicle);

        if !put_new(self.store.as_ref(), &Keys::vehicle(&vehicle.id), &vehicle).await? {
            return Err(FleetError::Store(format!(
                "Vehicle id collision: {}",
                vehicle.id
            )));
        }
        self.store
            .sadd(&Keys::manager_vehicles(&vehicle.manager_id), &vehicle.id)
            .await?;

        tracing::info!("Vehicle registered: {}", vehicle.id);
        Ok(vehicle.into())
    }

    async fn get_vehicle(&self, vehicle_id: &str) -> FleetResult<Option<VehicleResponse>> {
        if !IdGenerator::validate_id(vehicle_id, Some(IdType::Vehicle)) {
            tracing::warn!("Invalid vehicle ID format: {}", vehicle_id);
            return Ok(None);
        }

        tracing::debug!("Getting vehicle: {}", vehicle_id);
        let vehicle = get_doc::<Vehicle>(self.store.as_ref(), &Keys::vehicle(vehicle_id)).await?;
        Ok(vehicle.map(VehicleResponse::from))
    }

    async fn vehicles_by_manager(&self, manager_id: &str) -> FleetResult<Vec<VehicleResponse>> {
        tracing::debug!("Getting vehicles for manager: {}", manager_id);

        let ids = self
            .store
            .smembers(&Keys::manager_vehicles(manager_id))
            .await?;
        let loads = ids.iter().map(|id| {
            let key = Keys::vehicle(id);
            async move { get_doc::<Vehicle>(self.store.as_ref(), &key).await }
        });

        let mut vehicles: Vec<Vehicle> =
            try_join_all(loads).await?.into_iter().flatten().collect();
        vehicles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, put_doc};
    use crate::utils::clock::ManualClock;
    use chrono::{TimeZone, Utc};

    const MANAGER: &str = "mgr-250801-aaaaa";

    async fn service() -> VehicleService {
        let store = Arc::new(MemoryStore::new());
        put_doc(
            store.as_ref(),
            &Keys::manager(MANAGER),
            &Manager {
                id: MANAGER.to_string(),
                name: "Ama".to_string(),
                email: "ama@fleet.example".to_string(),
                created_at: Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap(),
            },
        )
        .await
        .unwrap();

        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap());
        VehicleService::new(store, Arc::new(clock))
    }

    fn registration() -> VehicleRegistration {
        VehicleRegistration {
            manager_id: MANAGER.to_string(),
            make: "Toyota".to_string(),
            model: "Hilux".to_string(),
            license_plate: "GR-1234-25".to_string(),
            mileage: 1000.0,
            inspection_passed: true,
            service_date: Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap(),
            insurance_expiry: None,
            next_service_mileage: Some(6000.0),
        }
    }

    #[tokio::test]
    async fn test_register_and_list() {
        let service = service().await;

        let registered = service.register_vehicle(registration()).await.unwrap();
        assert_eq!(registered.status, VehicleStatus::Available);
        assert_eq!(registered.mileage, 1000.0);
        assert_eq!(registered.service_dates.len(), 1);

        let fetched = service.get_vehicle(&registered.id).await.unwrap().unwrap();
        assert_eq!(fetched.license_plate, "GR-1234-25");

        let listed = service.vehicles_by_manager(MANAGER).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_register_collects_all_field_errors() {
        let service = service().await;

        let mut invalid = registration();
        invalid.make = String::new();
        invalid.license_plate = "  ".to_string();
        invalid.mileage = -5.0;

        let err = service.register_vehicle(invalid).await.unwrap_err();
        match err {
            FleetError::ValidationFailed(errors) => {
                assert_eq!(errors.len(), 3);
            }
            other => panic!("Expected ValidationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_requires_existing_manager() {
        let service = service().await;

        let mut orphan = registration();
        orphan.manager_id = "mgr-250801-zzzzz".to_string();
        let err = service.register_vehicle(orphan).await.unwrap_err();
        assert!(matches!(err, FleetError::ManagerNotFound(_)));
    }
}
