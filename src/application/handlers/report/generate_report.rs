//! GenerateReport handler.
//!
//! Requests a schema-constrained bulletin for the current selection and
//! parses it. Any failure yields the catalog-built fallback report.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::catalog::Period;
use crate::domain::report::{
    report_request_prompt, report_schema, Report, ReportParseError, REPORT_PROPERTY_ORDER,
    REPORT_SCHEMA_NAME,
};
use crate::domain::session::SessionToken;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, JsonSchema, MessageRole,
    RequestMetadata,
};

/// Why a bulletin could not be produced.
#[derive(Debug, Error)]
pub enum ReportFailure {
    #[error("provider call failed: {0}")]
    Provider(#[from] AIError),

    #[error("payload rejected: {0}")]
    Payload(#[from] ReportParseError),
}

impl ReportFailure {
    /// Short, stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportFailure::Provider(err) => err.kind(),
            ReportFailure::Payload(ReportParseError::Empty) => "empty_payload",
            ReportFailure::Payload(ReportParseError::Malformed(_)) => "malformed_payload",
        }
    }
}

/// What became of one report request.
#[derive(Debug)]
pub enum ReportOutcome {
    /// The model produced a conforming bulletin.
    Generated(Report),
    /// Something failed; render the fallback instead.
    Fallback(ReportFailure),
}

impl ReportOutcome {
    /// Maps a provider result onto an outcome.
    pub fn from_result(result: Result<CompletionResponse, AIError>) -> Self {
        let parsed = result.map_err(ReportFailure::from).and_then(|response| {
            Report::parse_payload(response.content.as_deref().unwrap_or_default())
                .map_err(ReportFailure::from)
        });

        match parsed {
            Ok(report) => ReportOutcome::Generated(report),
            Err(failure) => ReportOutcome::Fallback(failure),
        }
    }

    /// The report to show, falling back to catalog text for `period`.
    pub fn into_report(self, period: &Period) -> Report {
        match self {
            ReportOutcome::Generated(report) => report,
            ReportOutcome::Fallback(_) => Report::fallback(period),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ReportOutcome::Fallback(_))
    }
}

/// Report generator: one structured request per bulletin, no state kept
/// between calls.
pub struct ReportGenerator {
    ai_provider: Arc<dyn AIProvider>,
}

impl ReportGenerator {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self { ai_provider }
    }

    /// Produces a bulletin for the selection in `token`. Never fails.
    pub async fn generate(&self, token: SessionToken) -> ReportOutcome {
        let period = token.period().config();
        let persona = token.persona().config();

        let schema = JsonSchema::new(REPORT_SCHEMA_NAME, report_schema().clone())
            .with_property_ordering(REPORT_PROPERTY_ORDER);

        let request = CompletionRequest::new(RequestMetadata::new(token, "report"))
            .with_message(MessageRole::User, report_request_prompt(period, persona))
            .with_json_schema(schema);

        debug!(
            session = %token,
            trace_id = %request.metadata.trace_id,
            model = %self.ai_provider.provider_info().model,
            "requesting bulletin"
        );

        let outcome = ReportOutcome::from_result(self.ai_provider.complete(request).await);

        match &outcome {
            ReportOutcome::Generated(report) => debug!(
                session = %token,
                paragraphs = report.paragraphs.len(),
                "bulletin generated"
            ),
            ReportOutcome::Fallback(failure) => warn!(
                session = %token,
                error_kind = failure.kind(),
                error = %failure,
                "bulletin failed, using catalog fallback"
            ),
        }

        outcome
    }
}
