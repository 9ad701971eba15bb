//! Session handlers.
//!
//! Ties selection state to the conversation and report handlers.

mod roleplay_session;

pub use roleplay_session::{RequestReportResult, RoleplaySession, SubmitUtteranceResult};
