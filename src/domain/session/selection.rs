//! Selection state container.

use serde::Serialize;

use super::{SessionError, SessionToken, Theme};
use crate::domain::catalog::{PeriodId, PersonaId};
use crate::domain::conversation::Transcript;
use crate::domain::report::{Report, ReportSheet};

/// Period shown when a session opens (开元).
pub const DEFAULT_PERIOD: PeriodId = PeriodId::High;

/// Persona shown when a session opens (西市胡商).
pub const DEFAULT_PERSONA: PersonaId = PersonaId::Merchant;

/// Whether a late result was applied to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitOutcome {
    Applied,
    /// The selection changed while the call was outstanding.
    Discarded,
}

impl CommitOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommitOutcome::Applied)
    }
}

/// Everything a conversation call needs, captured under the state borrow.
#[derive(Debug, Clone)]
pub struct UtteranceTicket {
    pub token: SessionToken,
    /// Transcript before the new utterance.
    pub history: Transcript,
    /// Trimmed, non-empty user text.
    pub utterance: String,
}

/// Everything a report call needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportTicket {
    pub token: SessionToken,
    /// Distinguishes requests made under the same selection.
    pub request: u64,
}

/// Presentation state for one roleplay session.
///
/// # Invariants
///
/// - `transcript` always belongs to the current (period, persona) pair
/// - switching period or persona reseeds the transcript with the greeting,
///   drops any report and forgets outstanding calls
/// - at most one reply and one report are outstanding at a time
#[derive(Debug, Clone)]
pub struct SelectionState {
    period: PeriodId,
    persona: PersonaId,
    epoch: u64,
    transcript: Transcript,
    report: Option<Report>,
    pending_utterance: Option<(SessionToken, String)>,
    report_in_flight: Option<ReportTicket>,
    report_requests: u64,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD, DEFAULT_PERSONA)
    }
}

impl SelectionState {
    /// Opens a session on the given selection with a seeded transcript.
    pub fn new(period: PeriodId, persona: PersonaId) -> Self {
        Self {
            period,
            persona,
            epoch: 0,
            transcript: Transcript::seeded(persona),
            report: None,
            pending_utterance: None,
            report_in_flight: None,
            report_requests: 0,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn period(&self) -> PeriodId {
        self.period
    }

    pub fn persona(&self) -> PersonaId {
        self.persona
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// The open report together with its catalog side panels.
    pub fn report_sheet(&self) -> Option<ReportSheet> {
        self.report
            .as_ref()
            .map(|r| ReportSheet::new(r.clone(), self.period, self.persona))
    }

    pub fn token(&self) -> SessionToken {
        SessionToken::new(self.period, self.persona, self.epoch)
    }

    pub fn theme(&self) -> Theme {
        Theme::for_selection(self.period, self.persona)
    }

    /// User text awaiting a reply, for optimistic rendering.
    pub fn pending_utterance(&self) -> Option<&str> {
        self.pending_utterance.as_ref().map(|(_, text)| text.as_str())
    }

    pub fn is_conversation_busy(&self) -> bool {
        self.pending_utterance.is_some()
    }

    pub fn is_report_busy(&self) -> bool {
        self.report_in_flight.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Switches period. Returns false if it was already current.
    pub fn set_period(&mut self, period: PeriodId) -> bool {
        if self.period == period {
            return false;
        }
        self.period = period;
        self.reset();
        true
    }

    /// Switches persona. Returns false if it was already current.
    pub fn set_persona(&mut self, persona: PersonaId) -> bool {
        if self.persona == persona {
            return false;
        }
        self.persona = persona;
        self.reset();
        true
    }

    fn reset(&mut self) {
        self.epoch += 1;
        self.transcript = Transcript::seeded(self.persona);
        self.report = None;
        self.pending_utterance = None;
        self.report_in_flight = None;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conversation lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Claims the transcript for one exchange.
    ///
    /// # Errors
    ///
    /// - `EmptyUtterance` if the text is empty after trimming
    /// - `ConversationInFlight` if a previous exchange has not completed
    pub fn begin_utterance(&mut self, raw: &str) -> Result<UtteranceTicket, SessionError> {
        let utterance = raw.trim();
        if utterance.is_empty() {
            return Err(SessionError::EmptyUtterance);
        }
        if self.is_conversation_busy() {
            return Err(SessionError::ConversationInFlight);
        }

        let token = self.token();
        self.pending_utterance = Some((token, utterance.to_string()));

        Ok(UtteranceTicket {
            token,
            history: self.transcript.clone(),
            utterance: utterance.to_string(),
        })
    }

    /// Appends the exchange if the ticket still owns the transcript.
    pub fn complete_utterance(&mut self, ticket: &UtteranceTicket, reply: String) -> CommitOutcome {
        match &self.pending_utterance {
            Some((token, _)) if *token == ticket.token => {
                self.pending_utterance = None;
                self.transcript
                    .append_exchange(ticket.utterance.clone(), reply);
                CommitOutcome::Applied
            }
            _ => CommitOutcome::Discarded,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Report lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Claims the report slot for one generation.
    ///
    /// # Errors
    ///
    /// - `ReportInFlight` if a previous request has not completed
    pub fn begin_report(&mut self) -> Result<ReportTicket, SessionError> {
        if self.is_report_busy() {
            return Err(SessionError::ReportInFlight);
        }
        self.report_requests += 1;
        let ticket = ReportTicket {
            token: self.token(),
            request: self.report_requests,
        };
        self.report_in_flight = Some(ticket);
        Ok(ticket)
    }

    /// Stores the report, replacing any previous one, if still current.
    pub fn complete_report(&mut self, ticket: &ReportTicket, report: Report) -> CommitOutcome {
        if self.report_in_flight != Some(*ticket) {
            return CommitOutcome::Discarded;
        }
        self.report_in_flight = None;
        self.report = Some(report);
        CommitOutcome::Applied
    }

    /// Closes the report panel. A request still in flight is cancelled with it.
    pub fn dismiss_report(&mut self) {
        self.report = None;
        self.report_in_flight = None;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cancellation
    // ─────────────────────────────────────────────────────────────────────────

    /// Releases an utterance claim whose call was dropped before completing.
    ///
    /// The transcript is left as it was; newer claims are not touched.
    pub fn abandon_utterance(&mut self, ticket: &UtteranceTicket) {
        if matches!(&self.pending_utterance, Some((token, _)) if *token == ticket.token) {
            self.pending_utterance = None;
        }
    }

    /// Releases a report claim whose call was dropped before completing.
    pub fn abandon_report(&mut self, ticket: &ReportTicket) {
        if self.report_in_flight == Some(*ticket) {
            self.report_in_flight = None;
        }
    }
}
