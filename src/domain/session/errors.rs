//! Session-specific error types.

use thiserror::Error;

/// Reasons a session operation is refused.
///
/// Refusals leave the state untouched and never reach the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Utterance was empty or whitespace only.
    #[error("Utterance cannot be empty")]
    EmptyUtterance,

    /// A reply for this transcript is still outstanding.
    #[error("A reply is already in flight for this conversation")]
    ConversationInFlight,

    /// A report for this selection is still outstanding.
    #[error("A report is already being generated")]
    ReportInFlight,
}
