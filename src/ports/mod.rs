//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Model Ports
//!
//! - `AIProvider` - Port for generative-text model calls (plain and structured)

mod ai_provider;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, JsonSchema,
    Message, MessageRole, ProviderInfo, RequestMetadata, ResponseFormat, TokenUsage,
};
