// src/state.rs
use std::sync::Arc;
use tracing;

use crate::services::account_service::AccountService;
use crate::services::notification_service::{NotificationService, NotificationSink};
use crate::services::report_service::ReportService;
use crate::services::trip_service::TripService;
use crate::services::vehicle_guard::VehicleGuard;
use crate::services::vehicle_service::VehicleService;
use crate::store::{DocumentStore, MemoryStore, RedisStore, StoreError};
use crate::utils::clock::{Clock, SystemClock};

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub redis_url: Option<String>,
    pub webhook_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("FLEET_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            redis_url: std::env::var("FLEET_REDIS_URL").ok(),
            webhook_url: std::env::var("FLEET_WEBHOOK_URL").ok(),
        }
    }
}

pub struct AppState {
    pub trip_service: Arc<TripService>,
    pub vehicle_service: Arc<VehicleService>,
    pub account_service: Arc<AccountService>,
    pub report_service: Arc<ReportService>,
    pub notification_service: Arc<NotificationService>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn DocumentStore> = match &config.redis_url {
            Some(url) => Arc::new(RedisStore::new(url)?),
            None => {
                tracing::warn!("FLEET_REDIS_URL not set, using the in-memory store");
                Arc::new(MemoryStore::new())
            }
        };
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        if config.webhook_url.is_none() {
            tracing::warn!("FLEET_WEBHOOK_URL not set, notifications are persisted only");
        }
        let notification_service = Arc::new(NotificationService::new(
            store.clone(),
            clock.clone(),
            config.webhook_url.clone(),
        ));
        let sink: Arc<dyn NotificationSink> = notification_service.clone();

        let guard = Arc::new(VehicleGuard::new(store.clone()));
        let trip_service = Arc::new(TripService::new(
            store.clone(),
            guard,
            sink,
            clock.clone(),
        ));
        let vehicle_service = Arc::new(VehicleService::new(store.clone(), clock.clone()));
        let account_service = Arc::new(AccountService::new(store.clone(), clock.clone()));
        let report_service = Arc::new(ReportService::new(store, clock));

        Ok(Self {
            trip_service,
            vehicle_service,
            account_service,
            report_service,
            notification_service,
            config,
        })
    }
}
