//! Herald dispatch pipeline.
//!
//! This crate turns ingested events into delivered notifications:
//!
//! - [`matcher`] — selects and ranks the active rules matching an event.
//! - [`factory`] — creates pending notifications from matched rules.
//! - [`providers`] — the outbound transports (email, SMS, push, webhook)
//!   behind a single [`Provider`](providers::Provider) trait.
//! - [`delivery`] — the per-notification attempt cycle: claim, send,
//!   record the outcome.
//! - [`sweeper`] — background loops that surface due notifications and
//!   hand them to concurrent delivery attempts.

pub mod delivery;
pub mod factory;
pub mod matcher;
pub mod providers;
pub mod sweeper;

pub use factory::NotificationFactory;
pub use providers::ProviderRegistry;
pub use sweeper::{NotificationSweeper, SweeperConfig};

/// Serializes tests that read or mutate process environment variables;
/// the test runner is multi-threaded and the environment is shared.
#[cfg(test)]
pub(crate) fn env_guard() -> std::sync::MutexGuard<'static, ()> {
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    ENV_LOCK
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
