//! The per-notification delivery attempt cycle.
//!
//! One attempt is: atomically claim the row (Pending/Retrying →
//! Processing), hand it to the channel's transport provider with a send
//! timeout, then persist the outcome. A failed send increments
//! `retry_count` and either schedules a retry with exponential backoff or
//! lands in the terminal Failed state; an unexpected internal error takes
//! the same branch as a declared send failure. The outcome write itself
//! is retried so an in-memory result is not lost to a transient database
//! blip, which could otherwise strand the row in Processing.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use herald_core::retry::{after_failure, FailureOutcome};
use herald_core::types::DbId;
use herald_db::models::notification::Notification;
use herald_db::repositories::NotificationRepo;
use herald_db::DbPool;

use crate::providers::{ProviderError, ProviderRegistry};

/// Timeout for a single transport send.
pub const SEND_TIMEOUT_SECS: u64 = 30;

/// How many times an outcome write is attempted before giving up.
const OUTCOME_WRITE_ATTEMPTS: u32 = 3;

/// Pause between outcome write attempts.
const OUTCOME_WRITE_BACKOFF: Duration = Duration::from_millis(500);

/// Result of one delivery attempt, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Another worker claimed the notification first (or it already
    /// reached a terminal state).
    Skipped,
    /// The transport accepted the notification.
    Sent,
    /// The send failed and a retry was scheduled.
    Retrying,
    /// The send failed and retries are exhausted (or the failure was a
    /// configuration error).
    Failed,
}

/// Errors that abort an attempt before any outcome can be recorded.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Notification {0} not found")]
    NotFound(DbId),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Run one full delivery attempt for a notification.
pub async fn attempt(
    pool: &DbPool,
    providers: &ProviderRegistry,
    id: DbId,
) -> Result<AttemptOutcome, DeliveryError> {
    if !NotificationRepo::try_claim(pool, id).await? {
        tracing::debug!(notification_id = id, "Claim lost, another worker owns this attempt");
        return Ok(AttemptOutcome::Skipped);
    }

    let notification = NotificationRepo::find_by_id(pool, id)
        .await?
        .ok_or(DeliveryError::NotFound(id))?;

    let channel = match notification.channel() {
        Ok(channel) => channel,
        Err(e) => {
            // A row with an unknown channel string predates the closed
            // enum; treat it as a configuration error.
            return record_failure(pool, &notification, &e.to_string(), true).await;
        }
    };

    let send = providers.get(channel).send(
        &notification.recipient,
        notification.subject.as_deref(),
        &notification.body,
        &notification.metadata,
    );

    let result = match tokio::time::timeout(Duration::from_secs(SEND_TIMEOUT_SECS), send).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(SEND_TIMEOUT_SECS)),
    };

    match result {
        Ok(()) => {
            retry_write(|| NotificationRepo::mark_sent(pool, id)).await?;
            tracing::info!(notification_id = id, channel = %channel, "Notification sent");
            Ok(AttemptOutcome::Sent)
        }
        Err(e) => {
            tracing::warn!(
                notification_id = id,
                channel = %channel,
                error = %e,
                "Send attempt failed"
            );
            record_failure(pool, &notification, &e.to_string(), e.is_permanent()).await
        }
    }
}

/// Persist a failed attempt: bump the retry count and take the retry or
/// terminal branch. `permanent` short-circuits straight to Failed.
///
/// The absolute post-failure count is bound into the writes, so a write
/// replayed by [`retry_write`] after a lost ack cannot double-increment.
async fn record_failure(
    pool: &DbPool,
    notification: &Notification,
    error: &str,
    permanent: bool,
) -> Result<AttemptOutcome, DeliveryError> {
    let id = notification.id;
    let new_count = notification.retry_count + 1;

    if permanent {
        retry_write(|| NotificationRepo::mark_failed(pool, id, new_count, error)).await?;
        tracing::error!(notification_id = id, error, "Notification failed permanently");
        return Ok(AttemptOutcome::Failed);
    }

    match after_failure(new_count, notification.max_retries, Utc::now()) {
        FailureOutcome::Retry { scheduled_at } => {
            retry_write(|| {
                NotificationRepo::mark_retrying(pool, id, new_count, error, scheduled_at)
            })
            .await?;
            tracing::info!(
                notification_id = id,
                retry_count = new_count,
                next_attempt = %scheduled_at,
                "Retry scheduled"
            );
            Ok(AttemptOutcome::Retrying)
        }
        FailureOutcome::Exhausted => {
            retry_write(|| NotificationRepo::mark_failed(pool, id, new_count, error)).await?;
            tracing::error!(
                notification_id = id,
                retry_count = new_count,
                error,
                "Retries exhausted, notification failed"
            );
            Ok(AttemptOutcome::Failed)
        }
    }
}

/// Retry a persistence write a bounded number of times.
///
/// Losing the outcome write would strand the notification in Processing
/// until the stale sweep rescues it, so transient database errors get a
/// few more chances before the error surfaces.
async fn retry_write<F, Fut>(op: F) -> Result<(), sqlx::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<(), sqlx::Error>>,
{
    let mut last_err = None;
    for attempt in 1..=OUTCOME_WRITE_ATTEMPTS {
        match op().await {
            Ok(()) => return Ok(()),
            Err(e) => {
                tracing::warn!(attempt, error = %e, "Outcome write failed");
                last_err = Some(e);
                if attempt < OUTCOME_WRITE_ATTEMPTS {
                    tokio::time::sleep(OUTCOME_WRITE_BACKOFF).await;
                }
            }
        }
    }
    Err(last_err.expect("at least one attempt was made"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retry_write_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_write(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(sqlx::Error::PoolTimedOut)
                } else {
                    Ok(())
                }
            }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_write_gives_up_after_bounded_attempts() {
        let calls = AtomicU32::new(0);
        let result = retry_write(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(sqlx::Error::PoolTimedOut) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), OUTCOME_WRITE_ATTEMPTS);
    }
}
