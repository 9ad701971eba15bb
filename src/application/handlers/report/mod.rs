//! Report handlers.
//!
//! Generates the daily bulletin for the current selection.

mod generate_report;

pub use generate_report::{ReportFailure, ReportGenerator, ReportOutcome};
