//! Notification template entity model and DTOs.

use herald_core::channel::Channel;
use herald_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `templates` table.
///
/// Templates are fetched once per notification creation and treated as an
/// immutable snapshot between lookup and render.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub name: String,
    pub notification_type: String,
    pub subject: Option<String>,
    pub body: String,
    pub variables: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for creating a template.
#[derive(Debug, Deserialize)]
pub struct CreateTemplate {
    pub name: String,
    pub notification_type: Channel,
    pub subject: Option<String>,
    pub body: String,
    #[serde(default)]
    pub variables: serde_json::Value,
}
