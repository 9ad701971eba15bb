//! Roleplay session orchestrator.
//!
//! Owns one [`SelectionState`] and drives the conversation client and the
//! report generator against it. The state lock is never held across a model
//! call: each operation claims a ticket, releases the lock, awaits the model,
//! then re-locks to commit. Results for a selection that is no longer current
//! are discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::adapters::ai::provider_from_config;
use crate::application::handlers::conversation::{ConversationClient, ReplyCommand, ReplyOutcome};
use crate::application::handlers::report::{ReportFailure, ReportGenerator, ReportOutcome};
use crate::config::{AiConfig, ConfigError};
use crate::domain::catalog::{CatalogError, PeriodId, PersonaId};
use crate::domain::conversation::Transcript;
use crate::domain::report::{Report, ReportSheet};
use crate::domain::session::{
    CommitOutcome, SelectionState, SessionError, Theme, DEFAULT_PERIOD, DEFAULT_PERSONA,
};
use crate::ports::AIProvider;

/// Result of submitting one utterance.
#[derive(Debug)]
pub struct SubmitUtteranceResult {
    /// What the model did with it.
    pub outcome: ReplyOutcome,
    /// Whether the exchange landed in the current transcript.
    pub commit: CommitOutcome,
}

impl SubmitUtteranceResult {
    /// Text shown as the persona's line.
    pub fn reply_text(&self) -> &str {
        self.outcome.text()
    }
}

/// Result of requesting a report.
#[derive(Debug)]
pub struct RequestReportResult {
    /// The generated or fallback report.
    pub report: Report,
    /// Set when `report` is the catalog fallback.
    pub failure: Option<ReportFailure>,
    /// Whether the report landed in the report slot.
    pub commit: CommitOutcome,
}

/// One user's roleplay session.
pub struct RoleplaySession {
    state: Mutex<SelectionState>,
    conversation: ConversationClient,
    reports: ReportGenerator,
}

impl RoleplaySession {
    /// Opens a session on the default selection (开元, 西市胡商).
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self::with_selection(ai_provider, DEFAULT_PERIOD, DEFAULT_PERSONA)
    }

    /// Opens a session on a specific selection.
    pub fn with_selection(
        ai_provider: Arc<dyn AIProvider>,
        period: PeriodId,
        persona: PersonaId,
    ) -> Self {
        Self {
            state: Mutex::new(SelectionState::new(period, persona)),
            conversation: ConversationClient::new(Arc::clone(&ai_provider)),
            reports: ReportGenerator::new(ai_provider),
        }
    }

    /// Opens a session backed by the configured provider.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the selected provider has no API key
    /// - `ProviderSetup` if the provider cannot be constructed
    pub fn from_config(config: &AiConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(provider_from_config(config)?))
    }

    fn lock(&self) -> MutexGuard<'_, SelectionState> {
        // State stays consistent across a panic: every mutation is a single
        // synchronous step.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Switches period. Returns false if it was already current.
    pub fn set_period(&self, period: PeriodId) -> bool {
        let mut state = self.lock();
        let changed = state.set_period(period);
        if changed {
            info!(session = %state.token(), "period changed, session reset");
        }
        changed
    }

    /// Switches period by slider position (0 = 贞观 .. 3 = 大顺).
    ///
    /// # Errors
    ///
    /// - `SliderOutOfRange` if `index` is past the last period
    pub fn set_period_by_slider(&self, index: usize) -> Result<bool, CatalogError> {
        Ok(self.set_period(PeriodId::from_slider_index(index)?))
    }

    /// Switches persona. Returns false if it was already current.
    pub fn set_persona(&self, persona: PersonaId) -> bool {
        let mut state = self.lock();
        let changed = state.set_persona(persona);
        if changed {
            info!(session = %state.token(), "persona changed, session reset");
        }
        changed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Model-backed operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Sends one utterance and appends it with the reply.
    ///
    /// On success the transcript grows by exactly two messages, even when
    /// the reply is a fallback line, unless the selection changed meanwhile.
    ///
    /// # Errors
    ///
    /// - `EmptyUtterance` if the text is blank; the model is not called
    /// - `ConversationInFlight` if a previous reply is outstanding
    pub async fn submit_utterance(&self, text: &str) -> Result<SubmitUtteranceResult, SessionError> {
        let ticket = self.lock().begin_utterance(text)?;

        let claim = Claim::new(self, {
            let ticket = ticket.clone();
            move |state: &mut SelectionState| state.abandon_utterance(&ticket)
        });
        let outcome = self.conversation.reply(ReplyCommand::from(&ticket)).await;
        claim.disarm();

        let commit = self
            .lock()
            .complete_utterance(&ticket, outcome.text().to_string());
        if commit == CommitOutcome::Discarded {
            debug!(session = %ticket.token, "discarding stale reply");
        }

        Ok(SubmitUtteranceResult { outcome, commit })
    }

    /// Generates a report for the current selection into the report slot.
    ///
    /// # Errors
    ///
    /// - `ReportInFlight` if a previous report is outstanding
    pub async fn request_report(&self) -> Result<RequestReportResult, SessionError> {
        let ticket = self.lock().begin_report()?;

        let claim = Claim::new(self, move |state: &mut SelectionState| {
            state.abandon_report(&ticket)
        });
        let outcome = self.reports.generate(ticket.token).await;
        claim.disarm();

        let (report, failure) = match outcome {
            ReportOutcome::Generated(report) => (report, None),
            ReportOutcome::Fallback(failure) => {
                (Report::fallback(ticket.token.period().config()), Some(failure))
            }
        };

        let commit = self.lock().complete_report(&ticket, report.clone());
        if commit == CommitOutcome::Discarded {
            debug!(session = %ticket.token, "discarding stale report");
        }

        Ok(RequestReportResult {
            report,
            failure,
            commit,
        })
    }

    /// Closes the report.
    pub fn dismiss_report(&self) {
        self.lock().dismiss_report();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Snapshots
    // ─────────────────────────────────────────────────────────────────────────

    /// Copy of the whole state.
    pub fn snapshot(&self) -> SelectionState {
        self.lock().clone()
    }

    pub fn period(&self) -> PeriodId {
        self.lock().period()
    }

    pub fn persona(&self) -> PersonaId {
        self.lock().persona()
    }

    pub fn transcript(&self) -> Transcript {
        self.lock().transcript().clone()
    }

    pub fn report(&self) -> Option<Report> {
        self.lock().report().cloned()
    }

    pub fn report_sheet(&self) -> Option<ReportSheet> {
        self.lock().report_sheet()
    }

    pub fn theme(&self) -> Theme {
        self.lock().theme()
    }

    pub fn pending_utterance(&self) -> Option<String> {
        self.lock().pending_utterance().map(str::to_owned)
    }

    pub fn is_conversation_busy(&self) -> bool {
        self.lock().is_conversation_busy()
    }

    pub fn is_report_busy(&self) -> bool {
        self.lock().is_report_busy()
    }
}

/// Releases an in-flight claim if the awaiting future is dropped.
struct Claim<'a, F>
where
    F: FnOnce(&mut SelectionState),
{
    session: &'a RoleplaySession,
    release: Option<F>,
}

impl<'a, F> Claim<'a, F>
where
    F: FnOnce(&mut SelectionState),
{
    fn new(session: &'a RoleplaySession, release: F) -> Self {
        Self {
            session,
            release: Some(release),
        }
    }

    fn disarm(mut self) {
        self.release = None;
    }
}

impl<F> Drop for Claim<'_, F>
where
    F: FnOnce(&mut SelectionState),
{
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(&mut *self.session.lock());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::conversation::{Speaker, SILENCE_FALLBACK, TRANSMISSION_FAILED_FALLBACK};
    use crate::domain::report::RESOLUTION_FAILED_NOTICE;
    use proptest::prelude::*;
    use std::time::Duration;

    const WELL_FORMED: &str =
        r#"{"title":"《开元邸报》","date":"公元 713 - 741 年","content":["西市胡椒涨。"]}"#;

    fn session(mock: &MockAIProvider) -> RoleplaySession {
        RoleplaySession::new(Arc::new(mock.clone()))
    }

    #[tokio::test]
    async fn submit_appends_user_then_persona() {
        let mock = MockAIProvider::new().with_response("贵客请看这匹波斯锦。");
        let session = session(&mock);

        let result = session.submit_utterance("  有何新货？ ").await.unwrap();

        assert_eq!(result.commit, CommitOutcome::Applied);
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.messages()[1].speaker(), Speaker::User);
        assert_eq!(transcript.messages()[1].text(), "有何新货？");
        assert_eq!(transcript.messages()[2].speaker(), Speaker::Persona);
        assert_eq!(transcript.messages()[2].text(), "贵客请看这匹波斯锦。");
        assert!(!session.is_conversation_busy());
    }

    #[tokio::test]
    async fn blank_utterance_never_reaches_the_model() {
        let mock = MockAIProvider::new();
        let session = session(&mock);

        let result = session.submit_utterance(" \t\n").await;

        assert!(matches!(result, Err(SessionError::EmptyUtterance)));
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn transport_failure_still_appends_two_messages() {
        let mock = MockAIProvider::new().with_error(MockError::Unavailable {
            message: "503".to_string(),
        });
        let session = session(&mock);

        let result = session.submit_utterance("你好").await.unwrap();

        assert_eq!(result.reply_text(), TRANSMISSION_FAILED_FALLBACK);
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.last().unwrap().text(), TRANSMISSION_FAILED_FALLBACK);
    }

    #[tokio::test]
    async fn absent_text_appends_silence_line() {
        let mock = MockAIProvider::new().with_empty_response();
        let session = session(&mock);

        session.submit_utterance("你好").await.unwrap();

        assert_eq!(session.transcript().last().unwrap().text(), SILENCE_FALLBACK);
    }

    #[tokio::test]
    async fn history_grows_across_exchanges() {
        let mock = MockAIProvider::new().with_response("一答").with_response("二答");
        let session = session(&mock);

        session.submit_utterance("一问").await.unwrap();
        session.submit_utterance("二问").await.unwrap();

        assert_eq!(session.transcript().len(), 5);
        let second_call = &mock.get_calls()[1];
        assert_eq!(second_call.messages.len(), 4);
        assert_eq!(second_call.messages[3].content, "二问");
    }

    #[tokio::test]
    async fn late_reply_after_persona_switch_is_discarded() {
        let mock = MockAIProvider::new()
            .with_response("迟到的回音")
            .with_delay(Duration::from_millis(50));
        let session = session(&mock);

        let (result, switched) = tokio::join!(session.submit_utterance("你好"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            session.set_persona(PersonaId::Guard)
        });

        assert!(switched);
        let result = result.unwrap();
        assert_eq!(result.commit, CommitOutcome::Discarded);
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0].text(), PersonaId::Guard.config().greeting);
        assert!(!session.is_conversation_busy());
    }

    #[tokio::test]
    async fn pending_utterance_is_visible_while_in_flight() {
        let mock = MockAIProvider::new().with_delay(Duration::from_millis(50));
        let session = session(&mock);

        let (_, pending) = tokio::join!(session.submit_utterance("米价几何？"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            (session.pending_utterance(), session.is_conversation_busy())
        });

        assert_eq!(pending, (Some("米价几何？".to_string()), true));
        assert_eq!(session.pending_utterance(), None);
    }

    #[tokio::test]
    async fn concurrent_submissions_are_serialized() {
        let mock = MockAIProvider::new().with_delay(Duration::from_millis(20));
        let session = session(&mock);

        let (first, second) =
            tokio::join!(session.submit_utterance("一"), session.submit_utterance("二"));

        assert!(first.is_ok());
        assert!(matches!(second, Err(SessionError::ConversationInFlight)));
        assert_eq!(session.transcript().len(), 3);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn report_and_reply_may_overlap() {
        let mock = MockAIProvider::new().with_delay(Duration::from_millis(20));
        let session = session(&mock);

        let (reply, report) = tokio::join!(session.submit_utterance("你好"), session.request_report());

        assert_eq!(reply.unwrap().commit, CommitOutcome::Applied);
        assert_eq!(report.unwrap().commit, CommitOutcome::Applied);
        assert_eq!(session.transcript().len(), 3);
        assert!(session.report().is_some());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn dropped_reply_releases_the_claim() {
        let mock = MockAIProvider::new().with_delay(Duration::from_secs(5));
        let session = session(&mock);

        let timed_out =
            tokio::time::timeout(Duration::from_millis(10), session.submit_utterance("你好")).await;

        assert!(timed_out.is_err());
        assert!(!session.is_conversation_busy());
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn well_formed_report_is_stored_verbatim() {
        let mock = MockAIProvider::new().with_response(WELL_FORMED);
        let session = session(&mock);

        let result = session.request_report().await.unwrap();

        assert!(result.failure.is_none());
        assert_eq!(result.report.title, "《开元邸报》");
        assert_eq!(session.report(), Some(result.report));
        let sheet = session.report_sheet().unwrap();
        assert_eq!(sheet.bulletin, PeriodId::High.config().bulletin_text);
    }

    #[tokio::test]
    async fn malformed_report_stores_fallback() {
        let mock = MockAIProvider::new().with_response("not json at all");
        let session = session(&mock);

        let result = session.request_report().await.unwrap();

        let period = PeriodId::High.config();
        assert!(result.failure.is_some());
        assert_eq!(result.report.title, period.report_headline);
        assert_eq!(result.report.date_label, period.year_range_label);
        assert_eq!(
            result.report.paragraphs,
            vec![RESOLUTION_FAILED_NOTICE, period.historical_context]
        );
        assert_eq!(session.report(), Some(result.report));
    }

    #[tokio::test]
    async fn late_report_after_period_switch_is_discarded() {
        let mock = MockAIProvider::new()
            .with_response(WELL_FORMED)
            .with_delay(Duration::from_millis(50));
        let session = session(&mock);

        let (result, _) = tokio::join!(session.request_report(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            session.set_period_by_slider(3).unwrap()
        });

        assert_eq!(result.unwrap().commit, CommitOutcome::Discarded);
        assert_eq!(session.period(), PeriodId::Late);
        assert!(session.report().is_none());
        assert!(!session.is_report_busy());
    }

    #[tokio::test]
    async fn report_dismissed_while_in_flight_stays_closed() {
        let mock = MockAIProvider::new()
            .with_response(WELL_FORMED)
            .with_delay(Duration::from_millis(50));
        let session = session(&mock);

        let (result, _) = tokio::join!(session.request_report(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(session.is_report_busy());
            session.dismiss_report();
        });

        assert_eq!(result.unwrap().commit, CommitOutcome::Discarded);
        assert!(session.report().is_none());
        assert!(!session.is_report_busy());
    }

    #[tokio::test]
    async fn second_report_replaces_first_and_dismiss_clears() {
        let second = r#"{"title":"《开元续报》","date":"公元 713 - 741 年","content":["其二。"]}"#;
        let mock = MockAIProvider::new().with_response(WELL_FORMED).with_response(second);
        let session = session(&mock);

        session.request_report().await.unwrap();
        session.request_report().await.unwrap();
        assert_eq!(session.report().unwrap().title, "《开元续报》");

        session.dismiss_report();
        assert!(session.report().is_none());
    }

    #[test]
    fn slider_out_of_range_is_rejected() {
        let session = session(&MockAIProvider::new());
        assert!(matches!(
            session.set_period_by_slider(4),
            Err(CatalogError::SliderOutOfRange { .. })
        ));
        assert_eq!(session.period(), DEFAULT_PERIOD);
    }

    #[test]
    fn theme_follows_selection() {
        let session = session(&MockAIProvider::new());
        session.set_period(PeriodId::Early);
        session.set_persona(PersonaId::Scholar);

        let theme = session.theme();
        assert_eq!(theme.background, PeriodId::Early.config().background_color);
        assert_eq!(theme.persona_accent, PersonaId::Scholar.config().accent_color);
    }

    fn run<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
            .block_on(future)
    }

    proptest! {
        #[test]
        fn transcript_grows_by_two_per_non_blank_utterance(
            utterances in prop::collection::vec("[ \\t]{0,2}[a-z米价]{0,4}[ \\t]{0,2}", 0..8)
        ) {
            let mock = MockAIProvider::new();
            let session = session(&mock);

            let accepted = run(async {
                let mut accepted = 0;
                for utterance in &utterances {
                    if session.submit_utterance(utterance).await.is_ok() {
                        accepted += 1;
                    }
                }
                accepted
            });

            let expected = utterances.iter().filter(|u| !u.trim().is_empty()).count();
            prop_assert_eq!(accepted, expected);
            prop_assert_eq!(session.transcript().len(), 1 + 2 * expected);
            prop_assert_eq!(mock.call_count(), expected);
        }

        #[test]
        fn any_switch_reseeds_with_greeting(
            period in prop::sample::select(PeriodId::all().to_vec()),
            persona in prop::sample::select(PersonaId::all().to_vec()),
        ) {
            let session = session(&MockAIProvider::new());
            run(session.submit_utterance("你好")).unwrap();

            session.set_period(period);
            session.set_persona(persona);

            let transcript = session.transcript();
            if period == DEFAULT_PERIOD && persona == DEFAULT_PERSONA {
                prop_assert_eq!(transcript.len(), 3);
            } else {
                prop_assert_eq!(transcript.len(), 1);
                prop_assert_eq!(transcript.messages()[0].speaker(), Speaker::Persona);
                prop_assert_eq!(transcript.messages()[0].text(), persona.config().greeting);
            }
        }
    }
}
