//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Model providers (Gemini, OpenAI, mock)

pub mod ai;

pub use ai::{provider_from_config, GeminiProvider, MockAIProvider, OpenAIProvider};
