//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod event_repo;
pub mod notification_repo;
pub mod rule_repo;
pub mod template_repo;

pub use event_repo::EventRepo;
pub use notification_repo::NotificationRepo;
pub use rule_repo::RuleRepo;
pub use template_repo::TemplateRepo;
