// src/services/notification_service.rs
use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::json;
use std::sync::Arc;
use tracing;
use uuid::Uuid;

use crate::errors::{FleetError, FleetResult};
use crate::models::notification::{Notification, RecipientType};
use crate::store::{DocumentStore, Keys, Snapshot, get_doc, put_doc};
use crate::utils::clock::Clock;
use crate::utils::id_generator::{IdGenerator, IdType};

/// Delivery seam for trip transitions. Fire-and-forget: callers log and
/// swallow failures, a dead sink never rolls back a transition.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(
        &self,
        recipient_id: &str,
        recipient_type: RecipientType,
        message: &str,
    ) -> FleetResult<()>;
}

/// Persists notification documents; optionally forwards each one to a
/// configured webhook endpoint without waiting for the response.
pub struct NotificationService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        webhook_url: Option<String>,
    ) -> Self {
        Self {
            store,
            clock,
            webhook_url,
            client: reqwest::Client::new(),
        }
    }

    fn forward_to_webhook(&self, notification: &Notification) {
        let Some(url) = self.webhook_url.clone() else {
            return;
        };

        let payload = json!({
            "delivery_id": Uuid::new_v4().to_string(),
            "notification_id": notification.id,
            "recipient_id": notification.recipient_id,
            "recipient_type": notification.recipient_type,
            "message": notification.message,
            "created_at": notification.created_at.to_rfc3339(),
        });
        let client = self.client.clone();
        let notification_id = notification.id.clone();

        tokio::spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!(
                        "Webhook rejected notification {}: {}",
                        notification_id,
                        response.status()
                    );
                }
                Ok(_) => {
                    tracing::debug!("Notification {} forwarded to webhook", notification_id);
                }
                Err(err) => {
                    tracing::warn!(
                        "Webhook delivery failed for notification {}: {}",
                        notification_id,
                        err
                    );
                }
            }
        });
    }

    /// Notifications for one recipient, newest first. `recipient_type`
    /// narrows the listing when two account types share an id space.
    pub async fn notifications_for(
        &self,
        recipient_id: &str,
        recipient_type: Option<RecipientType>,
    ) -> FleetResult<Vec<Notification>> {
        tracing::debug!("Listing notifications for recipient: {}", recipient_id);

        let ids = self
            .store
            .smembers(&Keys::recipient_notifications(recipient_id))
            .await?;
        let loads = ids.iter().map(|id| {
            let key = Keys::notification(id);
            async move { get_doc::<Notification>(self.store.as_ref(), &key).await }
        });

        let mut notifications: Vec<Notification> = try_join_all(loads)
            .await?
            .into_iter()
            .flatten()
            .filter(|n| recipient_type.is_none_or(|t| n.recipient_type == t))
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(notifications)
    }

    pub async fn mark_read(&self, notification_id: &str) -> FleetResult<Notification> {
        tracing::debug!("Marking notification as read: {}", notification_id);

        loop {
            let snapshot = Snapshot::<Notification>::load(
                self.store.as_ref(),
                &Keys::notification(notification_id),
            )
            .await?
            .ok_or_else(|| FleetError::NotificationNotFound(notification_id.to_string()))?;

            let mut notification = snapshot.doc.clone();
            if notification.read {
                return Ok(notification);
            }

            notification.read = true;
            if snapshot.commit(self.store.as_ref(), &notification).await? {
                return Ok(notification);
            }
        }
    }

    pub async fn delete(&self, notification_id: &str) -> FleetResult<()> {
        let key = Keys::notification(notification_id);
        let notification: Notification = get_doc(self.store.as_ref(), &key)
            .await?
            .ok_or_else(|| FleetError::NotificationNotFound(notification_id.to_string()))?;

        self.store.delete(&key).await?;
        self.store
            .srem(
                &Keys::recipient_notifications(&notification.recipient_id),
                notification_id,
            )
            .await?;

        tracing::info!("Notification deleted: {}", notification_id);
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for NotificationService {
    async fn notify(
        &self,
        recipient_id: &str,
        recipient_type: RecipientType,
        message: &str,
    ) -> FleetResult<()> {
        let notification = Notification {
            id: IdGenerator::generate(IdType::Notification),
            recipient_id: recipient_id.to_string(),
            recipient_type,
            message: message.to_string(),
            read: false,
            created_at: self.clock.now(),
        };

        put_doc(
            self.store.as_ref(),
            &Keys::notification(&notification.id),
            &notification,
        )
        .await?;
        self.store
            .sadd(
                &Keys::recipient_notifications(recipient_id),
                &notification.id,
            )
            .await?;

        tracing::info!(
            "Notification {} created for {}",
            notification.id,
            recipient_id
        );

        self.forward_to_webhook(&notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::utils::clock::ManualClock;
    use chrono::{Duration, TimeZone, Utc};

    fn service() -> NotificationService {
        let start = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap();
        NotificationService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(ManualClock::new(start)),
            None,
        )
    }

    #[tokio::test]
    async fn test_notify_persists_unread_document() {
        let service = service();
        service
            .notify("mgr-250801-aaaaa", RecipientType::Manager, "Trip completed")
            .await
            .unwrap();

        let listed = service
            .notifications_for("mgr-250801-aaaaa", Some(RecipientType::Manager))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].read);
        assert_eq!(listed[0].message, "Trip completed");
    }

    #[tokio::test]
    async fn test_listing_is_newest_first_and_filtered_by_type() {
        let start = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let service = NotificationService::new(
            Arc::new(MemoryStore::new()),
            clock.clone(),
            None,
        );

        service
            .notify("drv-250801-aaaaa", RecipientType::Driver, "first")
            .await
            .unwrap();
        clock.advance(Duration::minutes(5));
        service
            .notify("drv-250801-aaaaa", RecipientType::Driver, "second")
            .await
            .unwrap();

        let listed = service
            .notifications_for("drv-250801-aaaaa", Some(RecipientType::Driver))
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].message, "second");

        let none = service
            .notifications_for("drv-250801-aaaaa", Some(RecipientType::Manager))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_mark_read_and_delete() {
        let service = service();
        service
            .notify("mgr-250801-aaaaa", RecipientType::Manager, "Trip completed")
            .await
            .unwrap();

        let id = service
            .notifications_for("mgr-250801-aaaaa", None)
            .await
            .unwrap()[0]
            .id
            .clone();

        let updated = service.mark_read(&id).await.unwrap();
        assert!(updated.read);

        service.delete(&id).await.unwrap();
        let err = service.mark_read(&id).await.unwrap_err();
        assert!(matches!(err, FleetError::NotificationNotFound(_)));
        assert!(
            service
                .notifications_for("mgr-250801-aaaaa", None)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
