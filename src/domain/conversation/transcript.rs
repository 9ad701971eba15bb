//! Append-only transcript scoped to one (period, persona) session.

use serde::Serialize;

use super::{ConversationMessage, Speaker};
use crate::domain::catalog::PersonaId;

/// Ordered, append-only sequence of messages.
///
/// # Invariants
///
/// - Never empty: every transcript starts from [`Transcript::seeded`]
/// - The first message is the persona greeting, spoken by [`Speaker::Persona`]
/// - Messages are only ever appended as complete user/persona exchanges
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    messages: Vec<ConversationMessage>,
}

impl Transcript {
    /// Creates a fresh transcript holding only the persona's greeting.
    pub fn seeded(persona: PersonaId) -> Self {
        Self {
            messages: vec![ConversationMessage::persona(persona.config().greeting)],
        }
    }

    /// Appends one exchange: the user's utterance, then the persona's reply.
    pub fn append_exchange(&mut self, utterance: impl Into<String>, reply: impl Into<String>) {
        self.messages.push(ConversationMessage::user(utterance));
        self.messages.push(ConversationMessage::persona(reply));
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    /// Number of user utterances so far.
    pub fn user_turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.speaker() == Speaker::User)
            .count()
    }
}
