//! Message entity for transcripts.
//!
//! Messages are immutable records of one utterance. They are created once,
//! appended to a [`Transcript`](super::Transcript), and never edited.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp};

/// Who spoke a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The human at the keyboard.
    User,
    /// The selected persona (model output, greeting, or fallback line).
    Persona,
}

/// An immutable transcript entry.
///
/// # Invariants
///
/// - `id` is unique
/// - `created_at` is set at construction and never changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    id: MessageId,
    speaker: Speaker,
    text: String,
    created_at: Timestamp,
}

impl ConversationMessage {
    /// Creates a new message.
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            speaker,
            text: text.into(),
            created_at: Timestamp::now(),
        }
    }

    /// Creates a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text)
    }

    /// Creates a persona message.
    pub fn persona(text: impl Into<String>) -> Self {
        Self::new(Speaker::Persona, text)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns true if the user wrote this message.
    pub fn is_user(&self) -> bool {
        self.speaker == Speaker::User
    }

    /// Returns true if the persona spoke this message.
    pub fn is_persona(&self) -> bool {
        self.speaker == Speaker::Persona
    }
}
