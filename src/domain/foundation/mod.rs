//! Foundation module - Shared domain primitives.
//!
//! Contains the identifier and time value objects used by the
//! conversation and report vocabularies.

mod ids;
mod timestamp;

pub use ids::MessageId;
pub use timestamp::Timestamp;
