//! Identity of a selection at a point in time.

use serde::Serialize;
use std::fmt;

use crate::domain::catalog::{PeriodId, PersonaId};

/// Snapshot of "which transcript is current".
///
/// The epoch increases on every transcript reset, so a token issued before
/// a switch away and back to the same pair no longer matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionToken {
    period: PeriodId,
    persona: PersonaId,
    epoch: u64,
}

impl SessionToken {
    pub(crate) fn new(period: PeriodId, persona: PersonaId, epoch: u64) -> Self {
        Self {
            period,
            persona,
            epoch,
        }
    }

    pub fn period(&self) -> PeriodId {
        self.period
    }

    pub fn persona(&self) -> PersonaId {
        self.persona
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.period, self.persona, self.epoch)
    }
}
