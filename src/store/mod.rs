// src/store/mod.rs
pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Operation error: {0}")]
    Operation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Document store with per-document atomic read-modify-write primitives
/// plus id-index sets. Every mutating trip/vehicle operation goes through
/// `compare_and_swap` so a stale precondition can never win a race.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn put_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError>;
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &str,
        value: &str,
    ) -> Result<bool, StoreError>;
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;
    async fn delete_if(&self, key: &str, expected: &str) -> Result<bool, StoreError>;

    async fn sadd(&self, key: &str, member: &str) -> Result<(), StoreError>;
    async fn srem(&self, key: &str, member: &str) -> Result<(), StoreError>;
    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError>;
}

// Key builders for the different resources
pub struct Keys;

impl Keys {
    pub fn trip(trip_id: &str) -> String {
        format!("trip:{}", trip_id)
    }

    pub fn vehicle(vehicle_id: &str) -> String {
        format!("vehicle:{}", vehicle_id)
    }

    pub fn driver(driver_id: &str) -> String {
        format!("driver:{}", driver_id)
    }

    pub fn manager(manager_id: &str) -> String {
        format!("manager:{}", manager_id)
    }

    pub fn notification(notification_id: &str) -> String {
        format!("notification:{}", notification_id)
    }

    // Email -> id lookup documents
    pub fn driver_email(email: &str) -> String {
        format!("driver:email:{}", email.to_lowercase())
    }

    pub fn manager_email(email: &str) -> String {
        format!("manager:email:{}", email.to_lowercase())
    }

    // Index sets
    pub fn manager_trips(manager_id: &str) -> String {
        format!("manager:{}:trips", manager_id)
    }

    pub fn driver_trips(driver_id: &str) -> String {
        format!("driver:{}:trips", driver_id)
    }

    pub fn manager_vehicles(manager_id: &str) -> String {
        format!("manager:{}:vehicles", manager_id)
    }

    pub fn manager_drivers(manager_id: &str) -> String {
        format!("manager:{}:drivers", manager_id)
    }

    pub fn recipient_notifications(recipient_id: &str) -> String {
        format!("recipient:{}:notifications", recipient_id)
    }

    pub fn all_drivers() -> String {
        "drivers:all".to_string()
    }
}

/// A document read together with the exact stored bytes it came from.
/// `commit` succeeds only if nothing else wrote the key in between, which
/// makes load -> check precondition -> mutate -> commit an atomic
/// read-modify-write from the caller's point of view.
pub struct Snapshot<T> {
    pub key: String,
    pub doc: T,
    raw: String,
}

impl<T: Serialize + DeserializeOwned> Snapshot<T> {
    pub async fn load(
        store: &dyn DocumentStore,
        key: &str,
    ) -> Result<Option<Self>, StoreError> {
        match store.get(key).await? {
            Some(raw) => {
                let doc = serde_json::from_str(&raw)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(Self {
                    key: key.to_string(),
                    doc,
                    raw,
                }))
            }
            None => Ok(None),
        }
    }

    /// Swap in the updated document; false means another writer committed
    /// first and the caller must re-load and re-check its precondition.
    pub async fn commit(
        self,
        store: &dyn DocumentStore,
        updated: &T,
    ) -> Result<bool, StoreError> {
        let json = serde_json::to_string(updated)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        store.compare_and_swap(&self.key, &self.raw, &json).await
    }

    /// Delete the document only if it is still exactly what was read.
    pub async fn remove(self, store: &dyn DocumentStore) -> Result<bool, StoreError> {
        store.delete_if(&self.key, &self.raw).await
    }
}

pub async fn get_doc<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(raw) => {
            let doc = serde_json::from_str(&raw)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            Ok(Some(doc))
        }
        None => Ok(None),
    }
}

pub async fn put_doc<T: Serialize>(
    store: &dyn DocumentStore,
    key: &str,
    doc: &T,
) -> Result<(), StoreError> {
    let json =
        serde_json::to_string(doc).map_err(|e| StoreError::Serialization(e.to_string()))?;
    store.put(key, &json).await
}

/// Insert a fresh document; false if the key is already taken.
pub async fn put_new<T: Serialize>(
    store: &dyn DocumentStore,
    key: &str,
    doc: &T,
) -> Result<bool, StoreError> {
    let json =
        serde_json::to_string(doc).map_err(|e| StoreError::Serialization(e.to_string()))?;
    store.put_if_absent(key, &json).await
}
