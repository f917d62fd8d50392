// src/models/notification.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    Driver,
    Manager,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub recipient_type: RecipientType,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
