//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port for the supported model backends.
//!
//! ## Available Adapters
//!
//! - `GeminiProvider` - Google Gemini models (default backend)
//! - `OpenAIProvider` - OpenAI chat models
//! - `MockAIProvider` - Configurable mock for testing

mod gemini_provider;
mod mock_provider;
mod openai_provider;

pub use gemini_provider::{GeminiConfig, GeminiProvider, DEFAULT_GEMINI_MODEL};
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider, DEFAULT_OPENAI_MODEL};

use std::sync::Arc;

use crate::config::{AiConfig, AiProvider, ConfigError};
use crate::ports::AIProvider;

/// Builds the configured primary provider.
///
/// # Errors
///
/// - `ValidationFailed` if the selected provider has no API key
/// - `ProviderSetup` if the HTTP client cannot be constructed
pub fn provider_from_config(config: &AiConfig) -> Result<Arc<dyn AIProvider>, ConfigError> {
    config.validate()?;

    let provider: Arc<dyn AIProvider> = match config.primary_provider {
        AiProvider::Gemini => {
            let mut gemini = GeminiConfig::new(config.gemini_api_key.clone().unwrap_or_default())
                .with_timeout(config.timeout());
            if let Some(model) = &config.model {
                gemini = gemini.with_model(model.clone());
            }
            if let Some(url) = &config.base_url {
                gemini = gemini.with_base_url(url.clone());
            }
            Arc::new(GeminiProvider::new(gemini)?)
        }
        AiProvider::OpenAI => {
            let mut openai = OpenAIConfig::new(config.openai_api_key.clone().unwrap_or_default())
                .with_timeout(config.timeout());
            if let Some(model) = &config.model {
                openai = openai.with_model(model.clone());
            }
            if let Some(url) = &config.base_url {
                openai = openai.with_base_url(url.clone());
            }
            Arc::new(OpenAIProvider::new(openai)?)
        }
    };

    tracing::info!(
        provider = %provider.provider_info().name,
        model = %provider.provider_info().model,
        "model provider configured"
    );

    Ok(provider)
}
