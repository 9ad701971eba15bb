//! Gemini Provider - Implementation of AIProvider for Google's Gemini API.
//!
//! Talks to the `generateContent` endpoint. Plain replies carry a system
//! instruction, a temperature, an output ceiling and a thinking budget;
//! structured replies declare a `responseSchema` with `application/json`.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-3-flash-preview")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let provider = GeminiProvider::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, JsonSchema,
    MessageRole, ProviderInfo, ResponseFormat, TokenUsage,
};

/// Default model for both conversation and bulletins.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider with the given configuration.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the HTTP client cannot be built
    pub fn new(config: GeminiConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the generateContent endpoint URL.
    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Sends a request and maps transport failures.
    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let gemini_request = to_gemini_request(request);

        self.client
            .post(self.generate_url())
            .header("x-goog-api-key", self.config.api_key())
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(AIError::AuthenticationFailed),
            400 if error_body.contains("API_KEY_INVALID") => Err(AIError::AuthenticationFailed),
            400 => Err(AIError::InvalidRequest(error_body)),
            429 => Err(AIError::rate_limited(60)),
            500..=599 => Err(AIError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(AIError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }
}

#[async_trait]
impl AIProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.send_request(&request).await?;
        let response = self.handle_response_status(response).await?;

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        from_gemini_response(body, &self.config.model)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", self.config.model.clone())
            .with_structured_output(true)
            .with_thinking_budget(true)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Translation
// ════════════════════════════════════════════════════════════════════════════════

fn to_gemini_request(request: &CompletionRequest) -> GeminiRequest {
    let contents = request
        .messages
        .iter()
        .map(|msg| GeminiContent {
            role: match msg.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "model",
            }
            .to_string(),
            parts: vec![GeminiPart {
                text: msg.content.clone(),
            }],
        })
        .collect();

    let (response_mime_type, response_schema) = match &request.response_format {
        ResponseFormat::Text => (None, None),
        ResponseFormat::Json(schema) => (
            Some("application/json".to_string()),
            Some(to_gemini_schema(schema)),
        ),
    };

    GeminiRequest {
        contents,
        system_instruction: request.system_prompt.as_ref().map(|s| GeminiSystemInstruction {
            parts: vec![GeminiPart { text: s.clone() }],
        }),
        generation_config: GeminiGenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
            thinking_config: request.thinking_budget.map(|budget| GeminiThinkingConfig {
                thinking_budget: budget,
            }),
            response_mime_type,
            response_schema,
        },
    }
}

/// Converts a standard JSON Schema into Gemini's OpenAPI subset.
///
/// Type names are upper-cased, `additionalProperties` is dropped, and the
/// declared property ordering is attached to the root object.
fn to_gemini_schema(schema: &JsonSchema) -> Value {
    let mut converted = convert_schema_node(&schema.schema);
    if !schema.property_ordering.is_empty() {
        if let Value::Object(map) = &mut converted {
            map.insert(
                "propertyOrdering".to_string(),
                Value::from(schema.property_ordering.clone()),
            );
        }
    }
    converted
}

fn convert_schema_node(node: &Value) -> Value {
    match node {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != "additionalProperties")
                .map(|(key, value)| {
                    let value = match (key.as_str(), value) {
                        ("type", Value::String(t)) => Value::String(t.to_uppercase()),
                        _ => convert_schema_node(value),
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(convert_schema_node).collect()),
        other => other.clone(),
    }
}

fn from_gemini_response(body: GeminiResponse, model: &str) -> Result<CompletionResponse, AIError> {
    if let Some(error) = body.error {
        return Err(AIError::unavailable(error.message));
    }

    let candidate = body.candidates.and_then(|c| c.into_iter().next());

    if candidate.is_none() {
        if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AIError::content_filtered(reason));
        }
    }

    let finish_reason = match candidate
        .as_ref()
        .and_then(|c| c.finish_reason.as_deref())
    {
        Some("STOP") => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::Length,
        Some("SAFETY") | Some("PROHIBITED_CONTENT") | Some("BLOCKLIST") => {
            FinishReason::ContentFilter
        }
        _ => FinishReason::Other,
    };

    // Thought-summary parts are not part of the answer.
    let text: String = candidate
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought.unwrap_or(false))
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    let usage = body
        .usage_metadata
        .map(|u| {
            TokenUsage::new(
                u.prompt_token_count.unwrap_or(0),
                u.candidates_token_count.unwrap_or(0),
            )
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        content: if text.is_empty() { None } else { Some(text) },
        usage,
        model: body.model_version.unwrap_or_else(|| model.to_string()),
        finish_reason,
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// API Types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<GeminiThinkingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
    thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SelectionState;
    use crate::ports::RequestMetadata;
    use serde_json::json;

    fn metadata() -> RequestMetadata {
        RequestMetadata::new(SelectionState::default().token(), "reply")
    }

    fn parse(body: Value) -> Result<CompletionResponse, AIError> {
        let body: GeminiResponse = serde_json::from_value(body).unwrap();
        from_gemini_response(body, "gemini-test")
    }

    #[test]
    fn request_maps_roles_and_generation_config() {
        let request = CompletionRequest::new(metadata())
            .with_message(MessageRole::Assistant, "贵客！")
            .with_message(MessageRole::User, "米价几何？")
            .with_system_prompt("你是萨勒曼")
            .with_temperature(0.8)
            .with_max_tokens(600)
            .with_thinking_budget(100);

        let body = serde_json::to_value(to_gemini_request(&request)).unwrap();

        assert_eq!(body["contents"][0]["role"], "model");
        assert_eq!(body["contents"][1]["role"], "user");
        assert_eq!(body["contents"][1]["parts"][0]["text"], "米价几何？");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "你是萨勒曼");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 600);
        assert_eq!(body["generationConfig"]["thinkingConfig"]["thinkingBudget"], 100);
        assert!(body["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn structured_request_declares_gemini_schema() {
        let schema = JsonSchema::new(
            "bulletin",
            json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "content": { "type": "array", "items": { "type": "string" } }
                },
                "additionalProperties": false
            }),
        )
        .with_property_ordering(["title", "content"]);
        let request = CompletionRequest::new(metadata())
            .with_message(MessageRole::User, "生成邸报")
            .with_json_schema(schema);

        let body = serde_json::to_value(to_gemini_request(&request)).unwrap();
        let config = &body["generationConfig"];

        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["type"], "OBJECT");
        assert_eq!(config["responseSchema"]["properties"]["title"]["type"], "STRING");
        assert_eq!(config["responseSchema"]["properties"]["content"]["items"]["type"], "STRING");
        assert_eq!(config["responseSchema"]["propertyOrdering"], json!(["title", "content"]));
        assert!(config["responseSchema"].get("additionalProperties").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn response_text_skips_thought_parts() {
        let response = parse(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "思索中", "thought": true },
                    { "text": "米斗五钱，" },
                    { "text": "贵客。" }
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 8 }
        }))
        .unwrap();

        assert_eq!(response.content.as_deref(), Some("米斗五钱，贵客。"));
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage.total_tokens, 20);
        assert_eq!(response.model, "gemini-test");
    }

    #[test]
    fn oversized_usage_counts_saturate() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [{ "text": "米斗五钱" }] } }],
            "usageMetadata": { "promptTokenCount": 4294967295u32, "candidatesTokenCount": 1 }
        }))
        .unwrap();

        assert_eq!(response.content.as_deref(), Some("米斗五钱"));
        assert_eq!(response.usage.total_tokens, u32::MAX);
    }

    #[test]
    fn response_without_text_is_absent_not_error() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "MAX_TOKENS" }]
        }))
        .unwrap();

        assert_eq!(response.content, None);
        assert_eq!(response.finish_reason, FinishReason::Length);
    }

    #[test]
    fn blocked_prompt_is_content_filtered() {
        let err = parse(json!({ "promptFeedback": { "blockReason": "SAFETY" } })).unwrap_err();
        assert!(matches!(err, AIError::ContentFiltered { .. }));
    }

    #[test]
    fn embedded_error_is_unavailable() {
        let err = parse(json!({ "error": { "message": "backend overloaded" } })).unwrap_err();
        assert!(matches!(err, AIError::Unavailable { .. }));
    }

    #[test]
    fn generate_url_includes_model() {
        let provider = GeminiProvider::new(
            GeminiConfig::new("key")
                .with_model("gemini-x")
                .with_base_url("http://localhost:9999/"),
        )
        .unwrap();
        assert_eq!(
            provider.generate_url(),
            "http://localhost:9999/v1beta/models/gemini-x:generateContent"
        );
        assert_eq!(provider.provider_info().name, "gemini");
    }
}
