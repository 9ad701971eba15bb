//! Application layer - Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    ConversationClient, ReplyCommand, ReplyOutcome, ReportFailure, ReportGenerator,
    ReportOutcome, RequestReportResult, RoleplaySession, SubmitUtteranceResult,
};
