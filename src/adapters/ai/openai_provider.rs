//! OpenAI chat-completions backend.
//!
//! Alternate backend for deployments without a Gemini key. Bulletins are
//! requested with `response_format: json_schema` in strict mode. The
//! thinking budget has no counterpart here and is dropped.
//!
//! ```ignore
//! let provider = OpenAIProvider::new(OpenAIConfig::new(api_key).with_model("gpt-4o"))?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, MessageRole,
    ProviderInfo, ResponseFormat, TokenUsage,
};

/// Default model when OpenAI is the primary provider.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Wait suggested to callers when a 429 carries no usable hint.
const DEFAULT_RETRY_AFTER_SECS: u32 = 30;

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Single-shot chat completion client. Failures surface as `AIError`
/// without any retry.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let body = to_openai_request(&request, &self.config.model);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else {
                    AIError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(status_error(status, error_body));
        }

        let body: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        Ok(from_openai_response(body))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai", self.config.model.clone())
            .with_structured_output(true)
            .with_thinking_budget(false)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Translation
// ════════════════════════════════════════════════════════════════════════════════

fn to_openai_request<'a>(request: &'a CompletionRequest, model: &'a str) -> OpenAIRequest<'a> {
    let system = request.system_prompt.as_deref().map(|content| OpenAIMessage {
        role: "system",
        content,
    });

    let turns = request.messages.iter().map(|msg| OpenAIMessage {
        role: match msg.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        },
        content: &msg.content,
    });

    let response_format = match &request.response_format {
        ResponseFormat::Text => None,
        ResponseFormat::Json(schema) => Some(OpenAIResponseFormat {
            kind: "json_schema",
            json_schema: OpenAIJsonSchema {
                name: &schema.name,
                schema: &schema.schema,
                strict: true,
            },
        }),
    };

    OpenAIRequest {
        model,
        messages: system.into_iter().chain(turns).collect(),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        response_format,
    }
}

fn status_error(status: StatusCode, body: String) -> AIError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AIError::AuthenticationFailed,
        StatusCode::TOO_MANY_REQUESTS => AIError::rate_limited(retry_after_secs(&body)),
        StatusCode::BAD_REQUEST => AIError::InvalidRequest(body),
        s if s.is_server_error() => AIError::unavailable(format!("Server error {}: {}", s, body)),
        s => AIError::network(format!("Unexpected status {}: {}", s, body)),
    }
}

/// Reads the "try again in Ns" hint from a rate-limit error message.
fn retry_after_secs(body: &str) -> u32 {
    let message = serde_json::from_str::<OpenAIErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_default();

    message
        .split_once("try again in ")
        .and_then(|(_, rest)| {
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        })
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

fn from_openai_response(body: OpenAIResponse) -> CompletionResponse {
    let choice = body.choices.into_iter().next();

    let finish_reason = match choice.as_ref().and_then(|c| c.finish_reason.as_deref()) {
        Some("stop") => FinishReason::Stop,
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        _ => FinishReason::Other,
    };

    CompletionResponse {
        content: choice.and_then(|c| c.message.content),
        usage: body
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default(),
        model: body.model,
        finish_reason,
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Wire types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<OpenAIResponseFormat<'a>>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OpenAIResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: OpenAIJsonSchema<'a>,
}

#[derive(Debug, Serialize)]
struct OpenAIJsonSchema<'a> {
    name: &'a str,
    schema: &'a Value,
    strict: bool,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: String,
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIReply,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIReply {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorBody {
    error: OpenAIErrorMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorMessage {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SelectionState;
    use crate::ports::{JsonSchema, RequestMetadata};
    use serde_json::json;

    fn request() -> CompletionRequest {
        let metadata = RequestMetadata::new(SelectionState::default().token(), "reply");
        CompletionRequest::new(metadata)
            .with_system_prompt("你是萨勒曼")
            .with_message(MessageRole::Assistant, "贵客！")
            .with_message(MessageRole::User, "有何新货？")
            .with_temperature(0.8)
            .with_max_tokens(600)
            .with_thinking_budget(100)
    }

    #[test]
    fn config_overrides_apply() {
        let config = OpenAIConfig::new("test-key")
            .with_model("gpt-4o")
            .with_base_url("https://proxy.internal/v1/")
            .with_timeout(Duration::from_secs(30));
        let provider = OpenAIProvider::new(config).unwrap();

        assert_eq!(provider.completions_url(), "https://proxy.internal/v1/chat/completions");
        assert_eq!(provider.provider_info().model, "gpt-4o");
        assert_eq!(provider.config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn system_prompt_leads_the_message_list() {
        let request = request();
        let body = serde_json::to_value(to_openai_request(&request, "gpt-4o-mini")).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(body["messages"][2]["content"], "有何新货？");
        assert_eq!(body["max_tokens"], 600);
        assert!(body.get("response_format").is_none());
        assert!(body.get("thinking_budget").is_none());
    }

    #[test]
    fn structured_request_uses_strict_json_schema() {
        let schema = JsonSchema::new("daily_bulletin", json!({"type": "object"}));
        let request = request().with_json_schema(schema);
        let body = serde_json::to_value(to_openai_request(&request, "gpt-4o-mini")).unwrap();

        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "daily_bulletin");
        assert_eq!(body["response_format"]["json_schema"]["schema"]["type"], "object");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    }

    #[test]
    fn response_without_choices_has_no_content() {
        let body: OpenAIResponse =
            serde_json::from_value(json!({ "model": "gpt-4o-mini", "choices": [] })).unwrap();
        let response = from_openai_response(body);

        assert_eq!(response.content, None);
        assert_eq!(response.finish_reason, FinishReason::Other);
    }

    #[test]
    fn response_maps_content_and_usage() {
        let body: OpenAIResponse = serde_json::from_value(json!({
            "model": "gpt-4o-mini",
            "choices": [{ "message": { "role": "assistant", "content": "胡椒紧俏。" }, "finish_reason": "stop" }],
            "usage": { "prompt_tokens": 40, "completion_tokens": 9 }
        }))
        .unwrap();
        let response = from_openai_response(body);

        assert_eq!(response.content.as_deref(), Some("胡椒紧俏。"));
        assert_eq!(response.usage.total_tokens, 49);
        assert_eq!(response.finish_reason, FinishReason::Stop);
    }

    #[test]
    fn error_statuses_map_to_ai_errors() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new()),
            AIError::AuthenticationFailed
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "bad schema".into()),
            AIError::InvalidRequest(msg) if msg == "bad schema"
        ));
        assert_eq!(status_error(StatusCode::SERVICE_UNAVAILABLE, String::new()).kind(), "unavailable");
        assert_eq!(status_error(StatusCode::TOO_MANY_REQUESTS, String::new()).kind(), "rate_limited");
        assert_eq!(status_error(StatusCode::IM_A_TEAPOT, String::new()).kind(), "network");
    }

    #[test]
    fn rate_limit_reads_hint_or_defaults() {
        let hinted = r#"{"error":{"message":"Rate limit reached. Please try again in 7s."}}"#;
        assert_eq!(retry_after_secs(hinted), 7);
        assert_eq!(retry_after_secs(r#"{"error":{"message":"slow down"}}"#), 30);
        assert_eq!(retry_after_secs("<html>"), 30);
    }

    #[test]
    fn provider_info_reports_openai() {
        let provider = OpenAIProvider::new(OpenAIConfig::new("test-key")).unwrap();
        let info = provider.provider_info();
        assert_eq!(info.name, "openai");
        assert_eq!(info.model, DEFAULT_OPENAI_MODEL);
        assert!(!info.supports_thinking_budget);
    }
}
