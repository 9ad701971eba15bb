//! Color theming derived from the current selection.

use serde::Serialize;

use crate::domain::catalog::{PeriodId, PersonaId};

/// Hex colors a UI applies for the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub background: &'static str,
    pub accent: &'static str,
    pub persona_accent: &'static str,
}

impl Theme {
    pub fn for_selection(period: PeriodId, persona: PersonaId) -> Self {
        let period = period.config();
        Self {
            background: period.background_color,
            accent: period.accent_color,
            persona_accent: persona.config().accent_color,
        }
    }
}
