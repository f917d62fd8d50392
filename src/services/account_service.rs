// src/services/account_service.rs
use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing;

use crate::errors::{FleetError, FleetResult};
use crate::models::account::Account;
use crate::models::driver::{AccountStatus, Driver, DriverRegistration, DriverResponse};
use crate::models::manager::{Manager, ManagerRegistration};
use crate::models::vehicle::Vehicle;
use crate::store::{DocumentStore, Keys, Snapshot, get_doc, put_new};
use crate::utils::clock::Clock;
use crate::utils::id_generator::{IdGenerator, IdType, WithGeneratedId};

#[async_trait]
pub trait AccountOperations: Send + Sync {
    async fn create_driver(&self, registration: DriverRegistration)
    -> FleetResult<DriverResponse>;
    async fn create_manager(&self, registration: ManagerRegistration) -> FleetResult<Manager>;
    async fn find_by_email(&self, email: &str) -> FleetResult<Option<Account>>;
    async fn find_by_id(&self, account_id: &str) -> FleetResult<Option<Account>>;
    async fn assign_vehicle(
        &self,
        driver_id: &str,
        vehicle_id: &str,
    ) -> FleetResult<DriverResponse>;
    async fn unassign_vehicle(&self, driver_id: &str) -> FleetResult<DriverResponse>;
    async fn drivers_by_manager(&self, manager_id: &str) -> FleetResult<Vec<DriverResponse>>;
    async fn available_drivers(&self, manager_id: &str) -> FleetResult<Vec<DriverResponse>>;
    async fn unassigned_drivers(&self) -> FleetResult<Vec<DriverResponse>>;
}

/// One identity space over the driver and manager collections. Emails
/// are unique across BOTH; the union resolution happens here, at the
/// boundary, so the rest of the engine only sees a resolved `Account`.
pub struct AccountService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    async fn email_taken(&self, email: &str) -> FleetResult<bool> {
        let driver = self.store.get(&Keys::driver_email(email)).await?;
        let manager = self.store.get(&Keys::manager_email(email)).await?;
        Ok(driver.is_some() || manager.is_some())
    }

    async fn load_driver(&self, driver_id: &str) -> FleetResult<Snapshot<Driver>> {
        Snapshot::<Driver>::load(self.store.as_ref(), &Keys::driver(driver_id))
            .await?
            .ok_or_else(|| FleetError::driver_not_found(driver_id))
    }

    async fn load_drivers(&self, ids: Vec<String>) -> FleetResult<Vec<Driver>> {
        let loads = ids.iter().map(|id| {
            let key = Keys::driver(id);
            async move { get_doc::<Driver>(self.store.as_ref(), &key).await }
        });
        let mut drivers: Vec<Driver> =
            try_join_all(loads).await?.into_iter().flatten().collect();
        drivers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(drivers)
    }
}

#[async_trait]
impl AccountOperations for AccountService {
    async fn create_driver(
        &self,
        registration: DriverRegistration,
    ) -> FleetResult<DriverResponse> {
        let email = registration.email.trim().to_lowercase();
        tracing::info!("Creating driver account: {}", email);

        if email.is_empty() || registration.name.trim().is_empty() {
            return Err(FleetError::MissingRequiredField(
                if email.is_empty() { "email" } else { "name" }.to_string(),
            ));
        }
        if self.email_taken(&email).await? {
            return Err(FleetError::EmailTaken(email));
        }

        let mut driver = Driver {
            id: String::new(), // Set by with_generated_id below
            name: registration.name,
            email: email.clone(),
            account_status: AccountStatus::Active,
            is_assigned: false,
            assigned_vehicle_id: None,
            manager_id: registration.manager_id.clone(),
            license_expiry: registration.license_expiry,
            created_at: self.clock.now(),
        };
        driver.set_generated_id(IdType::Driver);

        // Claiming the email document is what makes the uniqueness check
        // hold up under two racing registrations.
        if !self
            .store
            .put_if_absent(&Keys::driver_email(&email), &driver.id)
            .await?
        {
            return Err(FleetError::EmailTaken(email));
        }

        if !put_new(self.store.as_ref(), &Keys::driver(&driver.id), &driver).await? {
            return Err(FleetError::Store(format!(
                "Driver id collision: {}",
                driver.id
            )));
        }
        self.store.sadd(&Keys::all_drivers(), &driver.id).await?;
        if let Some(manager_id) = &registration.manager_id {
            self.store
                .sadd(&Keys::manager_drivers(manager_id), &driver.id)
                .await?;
        }

        tracing::info!("Driver created: {}", driver.id);
        Ok(driver.into())
    }

    async fn create_manager(&self, registration: ManagerRegistration) -> FleetResult<Manager> {
        let email = registration.email.trim().to_lowercase();
        tracing::info!("Creating manager account: {}", email);

        if email.is_empty() || registration.name.trim().is_empty() {
            return Err(FleetError::MissingRequiredField(
                if email.is_empty() { "email" } else { "name" }.to_string(),
            ));
        }
        if self.email_taken(&email).await? {
            return Err(FleetError::EmailTaken(email));
        }

        let mut manager = Manager {
            id: String::new(), // Set by with_generated_id below
            name: registration.name,
            email: email.clone(),
            created_at: self.clock.now(),
        };
        manager.set_generated_id(IdType::Manager);

        if !self
            .store
            .put_if_absent(&Keys::manager_email(&email), &manager.id)
            .await?
        {
            return Err(FleetError::EmailTaken(email));
        }
        if !put_new(self.store.as_ref(), &Keys::manager(&manager.id), &manager).await? {
            return Err(FleetError::Store(format!(
                "Manager id collision: {}",
                manager.id
            )));
        }

        tracing::info!("Manager created: {}", manager.id);
        Ok(manager)
    }

    async fn find_by_email(&self, email: &str) -> FleetResult<Option<Account>> {
        let email = email.trim().to_lowercase();
        tracing::debug!("Resolving account by email: {}", email);

        if let Some(driver_id) = self.store.get(&Keys::driver_email(&email)).await? {
            let driver = get_doc::<Driver>(self.store.as_ref(), &Keys::driver(&driver_id)).await?;
            return Ok(driver.map(Account::Driver));
        }
        if let Some(manager_id) = self.store.get(&Keys::manager_email(&email)).await? {
            let manager =
                get_doc::<Manager>(self.store.as_ref(), &Keys::manager(&manager_id)).await?;
            return Ok(manager.map(Account::Manager));
        }
        Ok(None)
    }

    async fn find_by_id(&self, account_id: &str) -> FleetResult<Option<Account>> {
        tracing::debug!("Resolving account by id: {}", account_id);

        // The id prefix says which collection to look in.
        match IdGenerator::parse_id(account_id).map(|parsed| parsed.id_type) {
            Some(IdType::Driver) => {
                let driver =
                    get_doc::<Driver>(self.store.as_ref(), &Keys::driver(account_id)).await?;
                Ok(driver.map(Account::Driver))
            }
            Some(IdType::Manager) => {
                let manager =
                    get_doc::<Manager>(self.store.as_ref(), &Keys::manager(account_id)).await?;
                Ok(manager.map(Account::Manager))
            }
            _ => Ok(None),
        }
    }

    async fn assign_vehicle(
        &self,
        driver_id: &str,
        vehicle_id: &str,
    ) -> FleetResult<DriverResponse> {
        tracing::info!("Assigning vehicle {} to driver {}", vehicle_id, driver_id);

        // Take the vehicle side first so two drivers racing for one
        // vehicle settle on the vehicle record.
        loop {
            let snapshot =
                Snapshot::<Vehicle>::load(self.store.as_ref(), &Keys::vehicle(vehicle_id))
                    .await?
                    .ok_or_else(|| FleetError::vehicle_not_found(vehicle_id))?;

            let mut vehicle = snapshot.doc.clone();
            match &vehicle.assigned_driver_id {
                Some(current) if current == driver_id => break,
                Some(_) => {
                    return Err(FleetError::invalid_state(format!(
                        "Vehicle {} is already assigned to another driver",
                        vehicle_id
                    )));
                }
                None => {}
            }

            vehicle.assigned_driver_id = Some(driver_id.to_string());
            if snapshot.commit(self.store.as_ref(), &vehicle).await? {
                break;
            }
        }

        loop {
            let snapshot = self.load_driver(driver_id).await?;
            let mut driver = snapshot.doc.clone();
            driver.is_assigned = true;
            driver.assigned_vehicle_id = Some(vehicle_id.to_string());
            if snapshot.commit(self.store.as_ref(), &driver).await? {
                return Ok(driver.into());
            }
        }
    }

    async fn unassign_vehicle(&self, driver_id: &str) -> FleetResult<DriverResponse> {
        tracing::info!("Unassigning vehicle from driver {}", driver_id);

        let previous_vehicle = loop {
            let snapshot = self.load_driver(driver_id).await?;
            let mut driver = snapshot.doc.clone();
            let previous = driver.assigned_vehicle_id.take();
            driver.is_assigned = false;
            if snapshot.commit(self.store.as_ref(), &driver).await? {
                break previous;
            }
        };

        if let Some(vehicle_id) = previous_vehicle {
            loop {
                let Some(snapshot) =
                    Snapshot::<Vehicle>::load(self.store.as_ref(), &Keys::vehicle(&vehicle_id))
                        .await?
                else {
                    break;
                };
                let mut vehicle = snapshot.doc.clone();
                if vehicle.assigned_driver_id.as_deref() != Some(driver_id) {
                    break;
                }
                vehicle.assigned_driver_id = None;
                if snapshot.commit(self.store.as_ref(), &vehicle).await? {
                    break;
                }
            }
        }

        let driver = get_doc::<Driver>(self.store.as_ref(), &Keys::driver(driver_id))
            .await?
            .ok_or_else(|| FleetError::driver_not_found(driver_id))?;
        Ok(driver.into())
    }

    async fn drivers_by_manager(&self, manager_id: &str) -> FleetResult<Vec<DriverResponse>> {
        tracing::debug!("Getting drivers for manager: {}", manager_id);

        let ids = self
            .store
            .smembers(&Keys::manager_drivers(manager_id))
            .await?;
        let drivers = self.load_drivers(ids).await?;
        Ok(drivers.into_iter().map(DriverResponse::from).collect())
    }

    async fn available_drivers(&self, manager_id: &str) -> FleetResult<Vec<DriverResponse>> {
        tracing::debug!("Getting available drivers for manager: {}", manager_id);

        let ids = self
            .store
            .smembers(&Keys::manager_drivers(manager_id))
            .await?;
        let drivers = self.load_drivers(ids).await?;
        Ok(drivers
            .into_iter()
            .filter(|d| !d.is_assigned)
            .map(DriverResponse::from)
            .collect())
    }

    async fn unassigned_drivers(&self) -> FleetResult<Vec<DriverResponse>> {
        tracing::debug!("Getting drivers without a manager");

        let ids = self.store.smembers(&Keys::all_drivers()).await?;
        let drivers = self.load_drivers(ids).await?;
        Ok(drivers
            .into_iter()
            .filter(|d| d.manager_id.is_none())
            .map(DriverResponse::from)
            .collect())
    }
}
