//! Domain layer containing roleplay logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps)
//! - `catalog` - The closed set of periods and personas
//! - `conversation` - Transcript vocabulary and reply conditioning
//! - `report` - Daily bulletin article, prompt, schema and fallback
//! - `session` - Selection state, stale-result guard and theming

pub mod catalog;
pub mod conversation;
pub mod foundation;
pub mod report;
pub mod session;
