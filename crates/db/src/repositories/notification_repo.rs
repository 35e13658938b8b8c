//! Repository for the `notifications` table.
//!
//! Every status transition goes through a conditional UPDATE so that
//! concurrent workers serialize on the database row, never on in-process
//! locks.

use herald_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::notification::{NewNotification, Notification};
use crate::models::status::NotificationStatus;

/// Column list for `notifications` queries.
const COLUMNS: &str = "\
    id, rule_id, recipient, notification_type, subject, body, status_id, \
    retry_count, max_retries, scheduled_at, sent_at, error_message, \
    metadata, created_at, updated_at";

/// Provides lifecycle operations for outbound notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a new pending notification, returning the generated ID.
    pub async fn create(pool: &PgPool, input: &NewNotification) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notifications \
                 (rule_id, recipient, notification_type, subject, body, \
                  status_id, max_retries, scheduled_at, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id",
        )
        .bind(input.rule_id)
        .bind(&input.recipient)
        .bind(input.channel.as_str())
        .bind(&input.subject)
        .bind(&input.body)
        .bind(NotificationStatus::Pending.id())
        .bind(input.max_retries)
        .bind(input.scheduled_at)
        .bind(&input.metadata)
        .fetch_one(pool)
        .await
    }

    /// Find a notification by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notifications WHERE id = $1");
        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim a notification for a delivery attempt.
    ///
    /// Transitions to Processing only from Pending or Retrying. Zero rows
    /// affected means another worker already claimed it (or it reached a
    /// terminal state), and the caller must skip the attempt.
    pub async fn try_claim(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id IN ($3, $4)",
        )
        .bind(id)
        .bind(NotificationStatus::Processing.id())
        .bind(NotificationStatus::Pending.id())
        .bind(NotificationStatus::Retrying.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a successful send: Sent is terminal, `sent_at` is stamped
    /// and any previous error is cleared.
    pub async fn mark_sent(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notifications \
             SET status_id = $2, sent_at = NOW(), error_message = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(NotificationStatus::Sent.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a failed attempt that still has retries left.
    ///
    /// The caller passes the absolute post-failure count, so a replayed
    /// write (lost ack, retried by the caller) cannot double-increment.
    pub async fn mark_retrying(
        pool: &PgPool,
        id: DbId,
        retry_count: i32,
        error: &str,
        scheduled_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notifications \
             SET status_id = $2, retry_count = $3, \
                 error_message = $4, scheduled_at = $5, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(NotificationStatus::Retrying.id())
        .bind(retry_count)
        .bind(error)
        .bind(scheduled_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a terminally failed attempt.
    ///
    /// Takes the absolute post-failure count like [`mark_retrying`], and
    /// lands `retry_count` at no less than `max_retries` so the failed
    /// state always reflects exhaustion, including the immediate-failure
    /// path for configuration errors.
    ///
    /// [`mark_retrying`]: NotificationRepo::mark_retrying
    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        retry_count: i32,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notifications \
             SET status_id = $2, \
                 retry_count = GREATEST($3, max_retries), \
                 error_message = $4, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(NotificationStatus::Failed.id())
        .bind(retry_count)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Pending notifications whose scheduled time has arrived, oldest
    /// first for fairness.
    pub async fn list_due_pending(
        pool: &PgPool,
        now: Timestamp,
        limit: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE status_id = $1 AND scheduled_at <= $2 \
             ORDER BY scheduled_at ASC \
             LIMIT $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(NotificationStatus::Pending.id())
            .bind(now)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Retry-eligible notifications: Retrying, below the retry ceiling,
    /// and past their backoff deadline.
    pub async fn list_due_retrying(
        pool: &PgPool,
        now: Timestamp,
        limit: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE status_id = $1 AND retry_count < max_retries AND scheduled_at <= $2 \
             ORDER BY scheduled_at ASC \
             LIMIT $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(NotificationStatus::Retrying.id())
            .bind(now)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Release notifications stuck in Processing.
    ///
    /// A row untouched for longer than `stale_after_secs` belongs to a
    /// worker that crashed mid-send; it is returned to Retrying so the
    /// retry sweep can re-surface it. Returns the number of rows
    /// released.
    pub async fn release_stale_processing(
        pool: &PgPool,
        stale_after_secs: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET status_id = $1, scheduled_at = NOW(), updated_at = NOW() \
             WHERE status_id = $2 \
               AND updated_at < NOW() - ($3 * INTERVAL '1 second')",
        )
        .bind(NotificationStatus::Retrying.id())
        .bind(NotificationStatus::Processing.id())
        .bind(stale_after_secs)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Requeue a terminally failed notification for a fresh delivery
    /// cycle. Explicit operator action; never triggered automatically.
    ///
    /// Returns `false` if the notification is not in the Failed state.
    pub async fn requeue_failed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET status_id = $2, retry_count = 0, error_message = NULL, \
                 scheduled_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(NotificationStatus::Pending.id())
        .bind(NotificationStatus::Failed.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List notifications with an optional status filter, newest first.
    pub async fn list(
        pool: &PgPool,
        status: Option<NotificationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if status.is_some() {
            "WHERE status_id = $3"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             {filter} \
             ORDER BY created_at DESC \
             LIMIT $1 OFFSET $2"
        );
        let mut q = sqlx::query_as::<_, Notification>(&query).bind(limit).bind(offset);
        if let Some(status) = status {
            q = q.bind(status.id());
        }
        q.fetch_all(pool).await
    }

    /// Notification counts grouped by status ID.
    pub async fn status_counts(pool: &PgPool) -> Result<Vec<(i16, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT status_id, COUNT(*) FROM notifications GROUP BY status_id ORDER BY status_id",
        )
        .fetch_all(pool)
        .await
    }

    /// Notification counts grouped by channel.
    pub async fn counts_by_type(pool: &PgPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT notification_type, COUNT(*) FROM notifications \
             GROUP BY notification_type ORDER BY notification_type",
        )
        .fetch_all(pool)
        .await
    }
}
