// src/models/account.rs
use serde::{Deserialize, Serialize};

use crate::models::driver::Driver;
use crate::models::manager::Manager;
use crate::models::notification::RecipientType;

/// One identity space over the two disjoint account collections.
/// Resolved once at the boundary; the rest of the engine only uses the
/// common accessors.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Account {
    Driver(Driver),
    Manager(Manager),
}

impl Account {
    pub fn id(&self) -> &str {
        match self {
            Account::Driver(driver) => &driver.id,
            Account::Manager(manager) => &manager.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Account::Driver(driver) => &driver.name,
            Account::Manager(manager) => &manager.name,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Account::Driver(driver) => &driver.email,
            Account::Manager(manager) => &manager.email,
        }
    }

    pub fn recipient_type(&self) -> RecipientType {
        match self {
            Account::Driver(_) => RecipientType::Driver,
            Account::Manager(_) => RecipientType::Manager,
        }
    }
}
