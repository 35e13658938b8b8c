//! HTTP boundary for herald.
//!
//! CRUD management of rules and templates, event ingestion, notification
//! inspection, and read-side analytics. The dispatch pipeline itself
//! lives in `herald-dispatch`; this crate only feeds it.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
