//! Conversation domain module.
//!
//! Transcript vocabulary for one (period, persona) session and the pure
//! prompt assembly that conditions the model on that selection.

mod message;
mod prompt;
mod transcript;

pub use message::{ConversationMessage, Speaker};
pub use prompt::{
    conditioning_instruction, REPLY_MAX_CHARS, REPLY_TARGET_CHARS, SILENCE_FALLBACK,
    TRANSMISSION_FAILED_FALLBACK,
};
pub use transcript::Transcript;
