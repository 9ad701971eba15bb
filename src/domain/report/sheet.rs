//! Report sheet: an article plus the static panels shown beside it.

use serde::Serialize;

use super::Report;
use crate::domain::catalog::{PeriodId, PersonaId};

/// What a UI renders when a report is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSheet {
    pub report: Report,
    /// 斗米物价
    pub price_text: &'static str,
    /// 坊市指南
    pub market_guide: &'static str,
    /// 邸报摘要
    pub bulletin: &'static str,
}

impl ReportSheet {
    pub fn new(report: Report, period: PeriodId, persona: PersonaId) -> Self {
        let period = period.config();
        Self {
            report,
            price_text: period.price_text,
            market_guide: persona.config().market_guide,
            bulletin: period.bulletin_text,
        }
    }
}
