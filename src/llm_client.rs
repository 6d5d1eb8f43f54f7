//! Chat-completions client for the hosted language model.
//!
//! One `invoke` call sends the prompt, parses the reply as a JSON object and
//! retries only when the model's text is not valid JSON. Transport failures
//! and provider error statuses are returned straight away.

use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::prompts::Prompt;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

const SYSTEM_MESSAGE: &str = "You are a professional health and wellness AI assistant. \
    You always answer with a single valid JSON object that follows the requested structure exactly.";

const STRICT_SUFFIX: &str = "\n\nCRITICAL: Return ONLY valid JSON. No markdown, no explanations, \
    no text outside the JSON object.";

/// Per-call limits chosen by the calling domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvokeOptions {
    pub max_output_tokens: u32,
    /// Extra attempts allowed after the first when the reply is not JSON.
    pub retry_budget: u32,
    /// Ask the provider for JSON mode and append the JSON-only instruction.
    pub strict_json: bool,
}

impl InvokeOptions {
    /// Total model calls allowed, first attempt included.
    pub fn max_attempts(&self) -> u32 {
        self.retry_budget.saturating_add(1)
    }
}

/// A reply that parsed as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    body: Map<String, Value>,
    attempts: u32,
}

impl ModelReply {
    /// `None` unless `value` is a JSON object.
    pub fn from_value(value: Value, attempts: u32) -> Option<Self> {
        match value {
            Value::Object(body) => Some(Self { body, attempts }),
            _ => None,
        }
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Number of model calls it took to get this reply.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Credential missing or rejected by the provider.
    Configuration(String),
    /// Network failure, timeout or provider error status.
    Unavailable(String),
    MalformedOutput { attempts: u32, detail: String },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::Configuration(msg) => write!(f, "model provider misconfigured: {}", msg),
            LlmError::Unavailable(msg) => write!(f, "model provider unavailable: {}", msg),
            LlmError::MalformedOutput { attempts, detail } => write!(
                f,
                "model returned invalid JSON after {} attempt(s): {}",
                attempts, detail
            ),
        }
    }
}

impl std::error::Error for LlmError {}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for the provider's chat-completions endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    retry_delay: Duration,
}

impl LlmClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        Self::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.openai_model.clone(),
            Duration::from_secs(config.openai_timeout_secs),
        )
    }

    /// Pause between malformed-output retries.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub async fn invoke(&self, prompt: &Prompt, options: InvokeOptions) -> Result<ModelReply, LlmError> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "model provider API key is not configured".to_string(),
            ));
        }

        let fingerprint = prompt.fingerprint();
        let max_attempts = options.max_attempts();
        let mut last_detail = String::new();

        for attempt in 1..=max_attempts {
            tracing::info!(
                "Calling model {} (prompt {}, attempt {}/{})",
                self.model,
                fingerprint,
                attempt,
                max_attempts
            );

            let content = self.complete(prompt, options).await?;

            match parse_reply(&content, options.strict_json) {
                Ok(body) => {
                    tracing::info!(
                        "✓ Model reply parsed (prompt {}, attempt {})",
                        fingerprint,
                        attempt
                    );
                    return Ok(ModelReply {
                        body,
                        attempts: attempt,
                    });
                }
                Err(detail) => {
                    tracing::warn!(
                        "Model reply was not a JSON object (prompt {}, attempt {}): {}",
                        fingerprint,
                        attempt,
                        detail
                    );
                    last_detail = detail;
                    if attempt < max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(LlmError::MalformedOutput {
            attempts: max_attempts,
            detail: last_detail,
        })
    }

    /// One round trip. Returns the assistant text, empty if the provider sent none.
    async fn complete(&self, prompt: &Prompt, options: InvokeOptions) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let user_content = if options.strict_json {
            format!("{}{}", prompt.as_str(), STRICT_SUFFIX)
        } else {
            prompt.as_str().to_string()
        };

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: &user_content,
                },
            ],
            temperature: if options.strict_json { 0.25 } else { 0.3 },
            max_tokens: options.max_output_tokens,
            response_format: options.strict_json.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Model request failed: {}", e);
                LlmError::Unavailable(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            tracing::error!("Model provider rejected credentials: {}", status);
            return Err(LlmError::Configuration(format!(
                "provider rejected credentials ({})",
                status
            )));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Model provider returned {}: {}", status, error_text);
            return Err(LlmError::Unavailable(format!("provider returned {}", status)));
        }

        let envelope: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to decode provider response: {}", e);
            LlmError::Unavailable(format!("undecodable provider response: {}", e))
        })?;

        Ok(envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

fn parse_reply(content: &str, strict: bool) -> Result<Map<String, Value>, String> {
    let candidate = if strict {
        content.trim()
    } else {
        extract_json_object(content).ok_or_else(|| "no JSON object in reply".to_string())?
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(body)) => Ok(body),
        Ok(other) => Err(format!("expected a JSON object, got {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    // Literal pattern, cannot fail
    FENCE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap())
}

/// Pulls the outermost `{...}` span out of free-form model text, looking
/// inside a markdown code fence first.
pub fn extract_json_object(content: &str) -> Option<&str> {
    let inner = fence_regex()
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(content);

    let start = inner.find('{')?;
    let end = inner.rfind('}')?;
    (start < end).then(|| &inner[start..=end])
}
