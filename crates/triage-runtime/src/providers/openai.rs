//! OpenAI-compatible chat-completions provider.
//!
//! Works against any endpoint that speaks the `/chat/completions` dialect.
//! The default base URL points at Groq.
//!
//! ## Security
//!
//! The bearer token is an [`ApiCredential`] and is only exposed when the
//! `Authorization` header is set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    secrets::ApiCredential, ChatMessage, CompletionConfig, CompletionResponse, LlmProvider,
    ProviderError, TokenUsage,
};

/// Default API base URL (Groq's OpenAI-compatible endpoint).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// OpenAI-compatible provider.
pub struct OpenAiProvider {
    credential: ApiCredential,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiProvider {
    /// Create a provider for the default base URL.
    pub fn new(credential: ApiCredential) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    /// Set custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Where completion requests are sent.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

/// Chat-completions success envelope.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Pull the reply text out of a success body.
fn parse_envelope(body: &str) -> Result<CompletionResponse, ProviderError> {
    let envelope: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

    let choice = envelope
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("response has no choices".to_string()))?;

    let content = choice.message.content.ok_or_else(|| {
        ProviderError::InvalidResponse("first choice has no message content".to_string())
    })?;

    Ok(CompletionResponse {
        content: content.trim().to_string(),
        usage: envelope.usage.unwrap_or_default(),
        model: envelope.model,
        finish_reason: choice.finish_reason,
    })
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let request = ChatCompletionRequest {
            model: &config.model,
            messages: &messages,
            temperature: config.temperature,
        };

        // SECURITY: Only expose the credential here, at the point of use
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.credential.expose())
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(config.timeout)
                } else {
                    ProviderError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(config.timeout)
            } else {
                ProviderError::HttpError(e.to_string())
            }
        })?;

        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let completion = parse_envelope(&body)?;
        tracing::debug!(
            provider = self.name(),
            model = completion.model.as_deref().unwrap_or(&config.model),
            tokens = completion.usage.total(),
            finish_reason = completion.finish_reason.as_deref().unwrap_or("unknown"),
            "Completion received"
        );
        Ok(completion)
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}
