//! Repository for the `events` table.

use herald_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{CreateEvent, Event};

/// Column list for `events` queries.
const COLUMNS: &str = "id, event_type, user_id, payload, processed, created_at";

/// Maximum page size for event listing.
const MAX_LIMIT: i64 = 100;

/// Provides read/write operations for ingested events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new unprocessed event, returning the full row.
    pub async fn create(pool: &PgPool, input: &CreateEvent) -> Result<Event, sqlx::Error> {
        let payload = if input.payload.is_object() {
            input.payload.clone()
        } else {
            serde_json::Value::Object(Default::default())
        };
        let query = format!(
            "INSERT INTO events (event_type, user_id, payload) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&input.event_type)
            .bind(&input.user_id)
            .bind(&payload)
            .fetch_one(pool)
            .await
    }

    /// Find an event by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Flip the `processed` flag to true.
    ///
    /// Idempotent: returns `true` only for the invocation that actually
    /// performed the flip, `false` when the event was already processed
    /// or does not exist.
    pub async fn mark_processed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE events SET processed = true WHERE id = $1 AND processed = false")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Unprocessed events older than the grace window, oldest first.
    ///
    /// The grace window keeps the redelivery sweep from racing the
    /// ingest-time processing task on freshly created events.
    pub async fn list_unprocessed(
        pool: &PgPool,
        older_than_secs: i64,
        limit: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             WHERE processed = false \
               AND created_at < NOW() - ($1 * INTERVAL '1 second') \
             ORDER BY created_at ASC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(older_than_secs)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// List events, newest first.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             ORDER BY created_at DESC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(limit.min(MAX_LIMIT))
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
