//! Conversation handlers.
//!
//! Produces in-character replies for the selected persona.

mod reply;

pub use reply::{
    ConversationClient, ReplyCommand, ReplyOutcome, REPLY_MAX_OUTPUT_TOKENS, REPLY_TEMPERATURE,
    REPLY_THINKING_BUDGET,
};
