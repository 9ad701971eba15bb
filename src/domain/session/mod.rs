//! Session domain module.
//!
//! Selection state for one roleplay session: the current period and
//! persona, the transcript scoped to that pair, the report slot, and the
//! in-flight markers that serialize model calls.
//!
//! Model calls never run while the state is borrowed. Callers take a ticket
//! (`begin_*`), release the state, await the model, then hand the result
//! back (`complete_*`). A result is applied only if its [`SessionToken`]
//! still matches the state; otherwise it is discarded as stale.

mod errors;
mod selection;
mod theme;
mod token;

pub use errors::SessionError;
pub use selection::{
    CommitOutcome, ReportTicket, SelectionState, UtteranceTicket, DEFAULT_PERIOD,
    DEFAULT_PERSONA,
};
pub use theme::Theme;
pub use token::SessionToken;
