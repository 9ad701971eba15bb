//! Report domain module.
//!
//! The daily bulletin ("邸报") for a (period, persona) selection: the
//! structured article, its request prompt and output schema, the static
//! fallback used when generation fails, and the sheet that pairs an
//! article with catalog side panels.

mod prompt;
mod report;
mod sheet;

pub use prompt::{report_request_prompt, report_schema, REPORT_PROPERTY_ORDER, REPORT_SCHEMA_NAME};
pub use report::{Report, ReportParseError, RESOLUTION_FAILED_NOTICE};
pub use sheet::ReportSheet;
