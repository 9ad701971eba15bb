//! Application handlers.
//!
//! Handlers that orchestrate domain operations against the model port.

pub mod conversation;
pub mod report;
pub mod session;

pub use conversation::{ConversationClient, ReplyCommand, ReplyOutcome};
pub use report::{ReportFailure, ReportGenerator, ReportOutcome};
pub use session::{RequestReportResult, RoleplaySession, SubmitUtteranceResult};
