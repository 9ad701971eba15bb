//! Catalog error types.

use thiserror::Error;

/// Errors resolving externally supplied catalog references.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Unknown period id: {0}")]
    UnknownPeriod(String),

    #[error("Unknown persona id: {0}")]
    UnknownPersona(String),

    #[error("Slider index {index} out of range (0..{max})")]
    SliderOutOfRange { index: usize, max: usize },
}
