//! Report value object and payload parsing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::catalog::Period;

/// First paragraph of the fallback report.
pub const RESOLUTION_FAILED_NOTICE: &str = "时空节点解析失败...";

/// Errors turning model output into a [`Report`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportParseError {
    #[error("Report payload is empty")]
    Empty,

    #[error("Report payload does not match schema: {0}")]
    Malformed(String),
}

/// A structured bulletin article.
///
/// Serializes with the wire field names of the declared output schema
/// (`title`, `date`, `content`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    #[serde(rename = "date")]
    pub date_label: String,
    #[serde(rename = "content")]
    pub paragraphs: Vec<String>,
}

impl Report {
    pub fn new(
        title: impl Into<String>,
        date_label: impl Into<String>,
        paragraphs: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            date_label: date_label.into(),
            paragraphs,
        }
    }

    /// Parses a structured model payload.
    ///
    /// The payload must be a JSON object with a string `title`, a string
    /// `date` and an array of strings `content`. Fields are taken verbatim.
    pub fn parse_payload(payload: &str) -> Result<Self, ReportParseError> {
        if payload.trim().is_empty() {
            return Err(ReportParseError::Empty);
        }

        serde_json::from_str(payload).map_err(|e| ReportParseError::Malformed(e.to_string()))
    }

    /// Deterministic stand-in built only from catalog data.
    pub fn fallback(period: &Period) -> Self {
        Self {
            title: period.report_headline.to_string(),
            date_label: period.year_range_label.to_string(),
            paragraphs: vec![
                RESOLUTION_FAILED_NOTICE.to_string(),
                period.historical_context.to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::PeriodId;

    #[test]
    fn parses_conforming_payload_verbatim() {
        let payload = r#"{"title":"《开元通报》","date":"公元 713 - 741 年","content":["其一","其二","其三"]}"#;
        let report = Report::parse_payload(payload).unwrap();

        assert_eq!(report.title, "《开元通报》");
        assert_eq!(report.date_label, "公元 713 - 741 年");
        assert_eq!(report.paragraphs, vec!["其一", "其二", "其三"]);
    }

    #[test]
    fn rejects_empty_payload() {
        assert_eq!(Report::parse_payload("  "), Err(ReportParseError::Empty));
    }

    #[test]
    fn rejects_empty_object() {
        assert!(matches!(
            Report::parse_payload("{}"),
            Err(ReportParseError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_wrong_field_types() {
        let payload = r#"{"title":"t","date":"d","content":"not a list"}"#;
        assert!(matches!(
            Report::parse_payload(payload),
            Err(ReportParseError::Malformed(_))
        ));

        let payload = r#"{"title":"t","date":"d","content":[1,2]}"#;
        assert!(Report::parse_payload(payload).is_err());
    }

    #[test]
    fn rejects_non_json_text() {
        assert!(Report::parse_payload("这是一份邸报").is_err());
    }

    #[test]
    fn fallback_uses_catalog_data_only() {
        let period = PeriodId::Mid.config();
        let report = Report::fallback(period);

        assert_eq!(report.title, period.report_headline);
        assert_eq!(report.date_label, period.year_range_label);
        assert_eq!(report.paragraphs.len(), 2);
        assert_eq!(report.paragraphs[0], RESOLUTION_FAILED_NOTICE);
        assert_eq!(report.paragraphs[1], period.historical_context);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let report = Report::new("t", "d", vec!["p".to_string()]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["title"], "t");
        assert_eq!(json["date"], "d");
        assert_eq!(json["content"][0], "p");
    }
}
