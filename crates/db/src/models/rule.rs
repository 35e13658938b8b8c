//! Notification rule entity model and DTOs.

use herald_core::channel::Channel;
use herald_core::types::{DbId, Timestamp};
use herald_core::CoreError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `rules` table.
///
/// Rules are read-only from the dispatch pipeline's perspective; only the
/// management API mutates them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Rule {
    pub id: DbId,
    pub name: String,
    pub event_type: String,
    pub notification_type: String,
    pub template_id: Option<DbId>,
    pub conditions: serde_json::Value,
    pub is_active: bool,
    pub priority: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Rule {
    /// The rule's delivery channel, parsed from the stored type string.
    pub fn channel(&self) -> Result<Channel, CoreError> {
        self.notification_type.parse()
    }

    /// The conditions column as a JSON object map.
    pub fn conditions_object(&self) -> serde_json::Map<String, serde_json::Value> {
        self.conditions.as_object().cloned().unwrap_or_default()
    }
}

/// DTO for creating a rule.
#[derive(Debug, Deserialize)]
pub struct CreateRule {
    pub name: String,
    pub event_type: String,
    pub notification_type: Channel,
    pub template_id: Option<DbId>,
    #[serde(default)]
    pub conditions: serde_json::Value,
    pub is_active: Option<bool>,
    pub priority: Option<i32>,
}

/// DTO for patching a rule (all fields optional).
#[derive(Debug, Deserialize)]
pub struct UpdateRule {
    pub name: Option<String>,
    pub template_id: Option<DbId>,
    pub conditions: Option<serde_json::Value>,
    pub is_active: Option<bool>,
    pub priority: Option<i32>,
}
