//! Background sweeps that surface due notifications.
//!
//! Four independent cadences:
//!
//! - **pending sweep** — newly created notifications whose scheduled
//!   time has arrived;
//! - **retry sweep** — notifications waiting out their backoff;
//! - **stale sweep** — notifications stuck in Processing by a worker
//!   that crashed mid-send, released back to retry eligibility;
//! - **event sweep** — ingested events still unprocessed after a grace
//!   window (their ingest-time processing task died), replayed through
//!   the factory. The `processed` guard makes replays of completed
//!   events a no-op, so processing is at-least-once overall.
//!
//! Surfaced notifications are handed to concurrently spawned delivery
//! attempts bounded by a semaphore; the sweep loop itself never awaits a
//! send. Double-picking is prevented by the claim transition inside
//! [`delivery::attempt`](crate::delivery::attempt), not by the sweeps.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use herald_db::models::notification::Notification;
use herald_db::repositories::{EventRepo, NotificationRepo};
use herald_db::DbPool;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::delivery;
use crate::factory::NotificationFactory;
use crate::providers::ProviderRegistry;

/// How long an event may sit unprocessed before the event sweep
/// considers its ingest-time processing task dead.
const EVENT_REDELIVERY_GRACE_SECS: i64 = 60;

/// Sweep cadences and batch sizes.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Seconds between pending sweeps (default 60).
    pub pending_interval_secs: u64,
    /// Seconds between retry sweeps (default 300).
    pub retry_interval_secs: u64,
    /// Seconds between stale-Processing sweeps (default 300).
    pub stale_interval_secs: u64,
    /// Seconds between unprocessed-event sweeps (default 60).
    pub event_interval_secs: u64,
    /// Maximum notifications surfaced per pending sweep (default 100).
    pub pending_batch: i64,
    /// Maximum notifications surfaced per retry sweep (default 50).
    pub retry_batch: i64,
    /// Maximum events replayed per event sweep (default 50).
    pub event_batch: i64,
    /// Seconds a Processing row may go untouched before it is considered
    /// abandoned (default 120: the send timeout plus margin).
    pub stale_after_secs: i64,
    /// Maximum concurrently running delivery attempts (default 16).
    pub max_in_flight: usize,
}

impl SweeperConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default |
    /// |--------------------------------|---------|
    /// | `SWEEP_PENDING_INTERVAL_SECS`  | `60`    |
    /// | `SWEEP_RETRY_INTERVAL_SECS`    | `300`   |
    /// | `SWEEP_STALE_INTERVAL_SECS`    | `300`   |
    /// | `SWEEP_EVENT_INTERVAL_SECS`    | `60`    |
    /// | `SWEEP_PENDING_BATCH`          | `100`   |
    /// | `SWEEP_RETRY_BATCH`            | `50`    |
    /// | `SWEEP_EVENT_BATCH`            | `50`    |
    /// | `SWEEP_STALE_AFTER_SECS`       | `120`   |
    /// | `SWEEP_MAX_IN_FLIGHT`          | `16`    |
    pub fn from_env() -> Self {
        Self {
            pending_interval_secs: env_or("SWEEP_PENDING_INTERVAL_SECS", 60),
            retry_interval_secs: env_or("SWEEP_RETRY_INTERVAL_SECS", 300),
            stale_interval_secs: env_or("SWEEP_STALE_INTERVAL_SECS", 300),
            event_interval_secs: env_or("SWEEP_EVENT_INTERVAL_SECS", 60),
            pending_batch: env_or("SWEEP_PENDING_BATCH", 100),
            retry_batch: env_or("SWEEP_RETRY_BATCH", 50),
            event_batch: env_or("SWEEP_EVENT_BATCH", 50),
            stale_after_secs: env_or("SWEEP_STALE_AFTER_SECS", 120),
            max_in_flight: env_or("SWEEP_MAX_IN_FLIGHT", 16),
        }
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            pending_interval_secs: 60,
            retry_interval_secs: 300,
            stale_interval_secs: 300,
            event_interval_secs: 60,
            pending_batch: 100,
            retry_batch: 50,
            event_batch: 50,
            stale_after_secs: 120,
            max_in_flight: 16,
        }
    }
}

fn env_or<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Background service that drives notification delivery.
pub struct NotificationSweeper {
    pool: DbPool,
    providers: Arc<ProviderRegistry>,
    config: SweeperConfig,
    in_flight: Arc<Semaphore>,
}

impl NotificationSweeper {
    /// Create a sweeper over the given pool and provider registry.
    pub fn new(pool: DbPool, providers: Arc<ProviderRegistry>, config: SweeperConfig) -> Self {
        let in_flight = Arc::new(Semaphore::new(config.max_in_flight));
        Self {
            pool,
            providers,
            config,
            in_flight,
        }
    }

    /// Run the sweep loops until the token is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut pending =
            tokio::time::interval(Duration::from_secs(self.config.pending_interval_secs));
        let mut retrying =
            tokio::time::interval(Duration::from_secs(self.config.retry_interval_secs));
        let mut stale = tokio::time::interval(Duration::from_secs(self.config.stale_interval_secs));
        let mut events = tokio::time::interval(Duration::from_secs(self.config.event_interval_secs));

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification sweeper cancelled");
                    break;
                }
                _ = pending.tick() => self.sweep_pending().await,
                _ = retrying.tick() => self.sweep_retrying().await,
                _ = stale.tick() => self.sweep_stale().await,
                _ = events.tick() => self.sweep_events().await,
            }
        }
    }

    /// Surface pending notifications whose scheduled time has arrived.
    async fn sweep_pending(&self) {
        match NotificationRepo::list_due_pending(&self.pool, Utc::now(), self.config.pending_batch)
            .await
        {
            Ok(due) => {
                if !due.is_empty() {
                    tracing::info!(count = due.len(), "Dispatching pending notifications");
                }
                self.dispatch_batch(due);
            }
            Err(e) => tracing::error!(error = %e, "Pending sweep failed"),
        }
    }

    /// Surface retry-eligible notifications past their backoff deadline.
    async fn sweep_retrying(&self) {
        match NotificationRepo::list_due_retrying(&self.pool, Utc::now(), self.config.retry_batch)
            .await
        {
            Ok(due) => {
                if !due.is_empty() {
                    tracing::info!(count = due.len(), "Dispatching retry-due notifications");
                }
                self.dispatch_batch(due);
            }
            Err(e) => tracing::error!(error = %e, "Retry sweep failed"),
        }
    }

    /// Release notifications abandoned in Processing by a crashed worker.
    async fn sweep_stale(&self) {
        match NotificationRepo::release_stale_processing(&self.pool, self.config.stale_after_secs)
            .await
        {
            Ok(0) => {}
            Ok(released) => {
                tracing::warn!(released, "Released stale in-flight notifications");
            }
            Err(e) => tracing::error!(error = %e, "Stale sweep failed"),
        }
    }

    /// Replay events whose ingest-time processing task never finished.
    async fn sweep_events(&self) {
        let stranded = match EventRepo::list_unprocessed(
            &self.pool,
            EVENT_REDELIVERY_GRACE_SECS,
            self.config.event_batch,
        )
        .await
        {
            Ok(events) => events,
            Err(e) => {
                tracing::error!(error = %e, "Event sweep failed");
                return;
            }
        };

        if stranded.is_empty() {
            return;
        }
        tracing::warn!(count = stranded.len(), "Reprocessing stranded events");

        for event in stranded {
            if let Err(e) = NotificationFactory::process_event(&self.pool, event.id).await {
                tracing::error!(event_id = event.id, error = %e, "Event reprocessing failed");
            }
        }
    }

    /// Spawn a delivery attempt per surfaced notification, bounded by
    /// the in-flight semaphore. The claim inside the attempt makes a
    /// concurrent duplicate pick a harmless no-op.
    fn dispatch_batch(&self, batch: Vec<Notification>) {
        for notification in batch {
            let pool = self.pool.clone();
            let providers = Arc::clone(&self.providers);
            let in_flight = Arc::clone(&self.in_flight);

            tokio::spawn(async move {
                let _permit = match in_flight.acquire_owned().await {
                    Ok(permit) => permit,
                    // Semaphore closed: we are shutting down.
                    Err(_) => return,
                };
                if let Err(e) = delivery::attempt(&pool, &providers, notification.id).await {
                    tracing::error!(
                        notification_id = notification.id,
                        error = %e,
                        "Delivery attempt errored"
                    );
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_cadences() {
        let config = SweeperConfig::default();
        assert_eq!(config.pending_interval_secs, 60);
        assert_eq!(config.retry_interval_secs, 300);
        assert_eq!(config.event_interval_secs, 60);
        assert_eq!(config.pending_batch, 100);
        assert_eq!(config.retry_batch, 50);
        assert_eq!(config.event_batch, 50);
        assert!(config.stale_after_secs > delivery::SEND_TIMEOUT_SECS as i64);
    }

    #[test]
    fn from_env_falls_back_to_defaults() {
        let _env = crate::env_guard();
        std::env::remove_var("SWEEP_PENDING_INTERVAL_SECS");
        std::env::remove_var("SWEEP_EVENT_INTERVAL_SECS");
        let config = SweeperConfig::from_env();
        assert_eq!(config.pending_interval_secs, 60);
        assert_eq!(config.event_interval_secs, 60);
        assert_eq!(config.max_in_flight, 16);
    }
}
