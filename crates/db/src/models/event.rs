//! Event entity model and DTOs.

use herald_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `events` table.
///
/// Events are immutable once ingested except for the `processed` flag,
/// which flips to `true` exactly once after the notification factory has
/// run for the event.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub event_type: String,
    pub user_id: Option<String>,
    pub payload: serde_json::Value,
    pub processed: bool,
    pub created_at: Timestamp,
}

impl Event {
    /// The payload as a JSON object map, or an empty map when the payload
    /// is not an object.
    pub fn payload_object(&self) -> serde_json::Map<String, serde_json::Value> {
        self.payload.as_object().cloned().unwrap_or_default()
    }
}

/// DTO for ingesting a new event.
#[derive(Debug, Deserialize)]
pub struct CreateEvent {
    pub event_type: String,
    pub user_id: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}
