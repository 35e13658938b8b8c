//! Pure domain logic for the notification pipeline.
//!
//! Everything in this crate is side-effect free: condition evaluation,
//! recipient resolution, template rendering, and retry arithmetic. No
//! database, no network, no clocks beyond the timestamps callers pass in.

pub mod channel;
pub mod conditions;
pub mod error;
pub mod recipient;
pub mod retry;
pub mod template;
pub mod types;

pub use channel::Channel;
pub use error::CoreError;
