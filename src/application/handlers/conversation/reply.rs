//! Reply handler.
//!
//! Turns the current selection, the transcript so far and one new user
//! utterance into the persona's next line. Every failure is absorbed here and
//! mapped to fixed fallback text, so callers always get something to render.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::conversation::{
    conditioning_instruction, Speaker, Transcript, SILENCE_FALLBACK, TRANSMISSION_FAILED_FALLBACK,
};
use crate::domain::session::{SessionToken, UtteranceTicket};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, Message, RequestMetadata,
};

/// Creativity setting for in-character replies.
pub const REPLY_TEMPERATURE: f32 = 0.8;

/// Output ceiling: room for the 300-character cap plus reasoning.
pub const REPLY_MAX_OUTPUT_TOKENS: u32 = 600;

/// Tokens reserved for model-internal reasoning.
pub const REPLY_THINKING_BUDGET: u32 = 100;

/// Command to produce one persona reply.
#[derive(Debug, Clone)]
pub struct ReplyCommand {
    /// Selection the reply is for.
    pub token: SessionToken,
    /// Everything exchanged so far, not including `utterance`.
    pub history: Transcript,
    /// Non-empty, trimmed user text.
    pub utterance: String,
}

impl ReplyCommand {
    pub fn new(token: SessionToken, history: Transcript, utterance: impl Into<String>) -> Self {
        Self {
            token,
            history,
            utterance: utterance.into(),
        }
    }
}

impl From<&UtteranceTicket> for ReplyCommand {
    fn from(ticket: &UtteranceTicket) -> Self {
        Self::new(ticket.token, ticket.history.clone(), ticket.utterance.clone())
    }
}

/// What became of one reply request.
#[derive(Debug)]
pub enum ReplyOutcome {
    /// The model answered.
    Spoken(String),
    /// The model answered with no usable text.
    Silent,
    /// The call itself failed.
    TransmissionFailed(AIError),
}

impl ReplyOutcome {
    /// Maps a provider result onto an outcome.
    pub fn from_result(result: Result<CompletionResponse, AIError>) -> Self {
        match result {
            Ok(response) => match response.non_blank_text() {
                Some(text) => ReplyOutcome::Spoken(text.to_string()),
                None => ReplyOutcome::Silent,
            },
            Err(err) => ReplyOutcome::TransmissionFailed(err),
        }
    }

    /// Text to show as the persona's message.
    pub fn text(&self) -> &str {
        match self {
            ReplyOutcome::Spoken(text) => text,
            ReplyOutcome::Silent => SILENCE_FALLBACK,
            ReplyOutcome::TransmissionFailed(_) => TRANSMISSION_FAILED_FALLBACK,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ReplyOutcome::Spoken(text) => text,
            other => other.text().to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(self, ReplyOutcome::Spoken(_))
    }
}

/// Conversation client: conditions the model on the selection and asks it
/// for the persona's next line.
pub struct ConversationClient {
    ai_provider: Arc<dyn AIProvider>,
}

impl ConversationClient {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self { ai_provider }
    }

    /// Produces the persona's reply. Never fails.
    pub async fn reply(&self, cmd: ReplyCommand) -> ReplyOutcome {
        let period = cmd.token.period().config();
        let persona = cmd.token.persona().config();

        let request = CompletionRequest::new(RequestMetadata::new(cmd.token, "reply"))
            .with_system_prompt(conditioning_instruction(period, persona))
            .with_messages(build_turns(&cmd.history, &cmd.utterance))
            .with_temperature(REPLY_TEMPERATURE)
            .with_max_tokens(REPLY_MAX_OUTPUT_TOKENS)
            .with_thinking_budget(REPLY_THINKING_BUDGET);

        debug!(
            session = %cmd.token,
            trace_id = %request.metadata.trace_id,
            turns = request.messages.len(),
            model = %self.ai_provider.provider_info().model,
            "requesting persona reply"
        );

        let outcome = ReplyOutcome::from_result(self.ai_provider.complete(request).await);

        match &outcome {
            ReplyOutcome::Spoken(_) => debug!(session = %cmd.token, "persona replied"),
            ReplyOutcome::Silent => warn!(session = %cmd.token, "model returned no text"),
            ReplyOutcome::TransmissionFailed(err) => warn!(
                session = %cmd.token,
                error_kind = err.kind(),
                error = %err,
                "reply call failed"
            ),
        }

        outcome
    }
}

/// Prior transcript followed by the new utterance as the final user turn.
fn build_turns(history: &Transcript, utterance: &str) -> Vec<Message> {
    history
        .iter()
        .map(|msg| match msg.speaker() {
            Speaker::User => Message::user(msg.text()),
            Speaker::Persona => Message::assistant(msg.text()),
        })
        .chain(std::iter::once(Message::user(utterance)))
        .collect()
}
