//! Notification entity model and DTOs.

use herald_core::channel::Channel;
use herald_core::types::{DbId, Timestamp};
use herald_core::CoreError;
use serde::Serialize;
use sqlx::FromRow;

use crate::models::status::{NotificationStatus, StatusId};

/// A row from the `notifications` table.
///
/// The dispatch pipeline is the sole mutator of `status_id`,
/// `retry_count`, `sent_at`, and `error_message`; the factory is the sole
/// creator of rows.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub rule_id: Option<DbId>,
    pub recipient: String,
    pub notification_type: String,
    pub subject: Option<String>,
    pub body: String,
    pub status_id: StatusId,
    pub retry_count: i32,
    pub max_retries: i32,
    pub scheduled_at: Timestamp,
    pub sent_at: Option<Timestamp>,
    pub error_message: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Notification {
    /// The notification's delivery channel.
    pub fn channel(&self) -> Result<Channel, CoreError> {
        self.notification_type.parse()
    }

    /// The current lifecycle status.
    pub fn status(&self) -> Option<NotificationStatus> {
        NotificationStatus::from_id(self.status_id)
    }
}

/// Insert arguments for a new pending notification.
///
/// Only the notification factory constructs these.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub rule_id: DbId,
    pub recipient: String,
    pub channel: Channel,
    pub subject: Option<String>,
    pub body: String,
    pub max_retries: i32,
    pub scheduled_at: Timestamp,
    pub metadata: serde_json::Value,
}
