//! HTTP handlers, one module per resource.

pub mod analytics;
pub mod events;
pub mod health;
pub mod notifications;
pub mod rules;
pub mod templates;
