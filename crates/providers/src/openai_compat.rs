//! Chat-completions endpoint client.
//!
//! Speaks the `/chat/completions` dialect shared by OpenAI, OpenRouter,
//! Ollama and vLLM. The turn protocol is plain text, so only messages and
//! sampling settings go over the wire; no function-calling fields.

use async_trait::async_trait;
use levain_core::error::ProviderError;
use levain_core::message::{Message, Role};
use levain_core::provider::{ProviderRequest, ProviderResponse, Usage};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Used when a 429 carries no usable `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// A chat-completions endpoint.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            name: name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: http_client(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the per-request HTTP timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.client = http_client(secs);
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_default()
}

/// Wire role for a transcript role. Observations are replayed as user turns.
fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::Assistant => "assistant",
        Role::User | Role::Observation => "user",
    }
}

fn chat_request(request: &ProviderRequest) -> ChatRequest<'_> {
    ChatRequest {
        model: &request.model,
        messages: request.messages.iter().map(WireMessage::from).collect(),
        temperature: request.temperature,
        top_p: request.top_p,
        max_tokens: request.max_tokens,
        stream: false,
    }
}

/// Map a non-success HTTP status to a provider error.
fn status_error(status: StatusCode, retry_after: Option<u64>, body: String) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationFailed(
            format!("endpoint rejected the API key ({status})"),
        ),
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message: body,
        },
    }
}

fn into_response(completion: ChatCompletion) -> Result<ProviderResponse, ProviderError> {
    let Some(choice) = completion.choices.into_iter().next() else {
        return Err(ProviderError::ApiError {
            status_code: 200,
            message: "completion contained no choices".into(),
        });
    };

    Ok(ProviderResponse {
        content: choice.message.content.unwrap_or_default(),
        usage: completion.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
        model: completion.model,
    })
}

#[async_trait]
impl levain_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion"
        );

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&chat_request(&request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            let body = response.text().await.unwrap_or_default();
            warn!(provider = %self.name, %status, %body, "Endpoint returned an error");
            return Err(status_error(status, retry_after, body));
        }

        let completion: ChatCompletion =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: status.as_u16(),
                message: format!("unreadable completion body: {e}"),
            })?;

        into_response(completion)
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let response = self
            .client
            .get(self.endpoint("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// ── Wire types ──

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            role: wire_role(message.role()),
            content: message.content(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
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

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
