//! AI provider adapter: the single point of entry for every text-generation call.
//!
//! Two backends sit behind [`AiProvider`]: any OpenAI-compatible chat completions
//! server and Google's native Gemini API. Callers build an [`AiRequest`] and pick
//! the backend through [`create_provider`]; nothing else talks to a model directly.
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::settings::{AiSettings, ProviderType};

pub mod gemini;
pub mod openai;
pub mod retry;
pub mod sse;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// Applies to the whole exchange, streamed body included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum AiError {
    #[error("{message}")]
    Api {
        status: Option<u16>,
        code: Option<String>,
        kind: Option<String>,
        message: String,
    },

    #[error(
        "Request timed out after 2 minutes. The model may be too slow or the server is overloaded. \
         Try using a faster model or check your server status."
    )]
    Timeout,

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    EmptyResponse(String),

    #[error("AI generated an empty response. Please try rephrasing the job description.")]
    EmptyContent,

    #[error("{0}")]
    MaxTokensExceeded(String),

    #[error("Response was blocked by safety filters. Try rephrasing your request.")]
    SafetyFilter,

    #[error(
        "Response was blocked due to potential copyright concerns. Try rephrasing your request."
    )]
    RecitationBlocked,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed provider response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl AiError {
    /// Stable snake_case code, surfaced to clients upper-cased.
    pub fn code(&self) -> &str {
        match self {
            AiError::Api { code, .. } => code.as_deref().unwrap_or("api_error"),
            AiError::Timeout => "timeout",
            AiError::Network(_) => "network_error",
            AiError::EmptyResponse(_) => "empty_response",
            AiError::EmptyContent => "empty_content",
            AiError::MaxTokensExceeded(_) => "max_tokens_exceeded",
            AiError::SafetyFilter => "safety_filter",
            AiError::RecitationBlocked => "recitation_blocked",
            AiError::Http(_) => "http_error",
            AiError::Parse(_) => "parse_error",
        }
    }

    /// Classifies a transport failure. `unreachable` is the backend-specific
    /// message shown when the server cannot be reached at all.
    /// The URL is dropped from the error so query strings never reach logs or clients.
    pub(crate) fn transport(e: reqwest::Error, unreachable: &str) -> Self {
        let e = e.without_url();
        if e.is_timeout() {
            AiError::Timeout
        } else if e.is_connect() || e.is_request() {
            AiError::Network(unreachable.to_string())
        } else {
            AiError::Http(e)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Unified request / response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiMessage {
    pub role: Role,
    pub content: String,
}

impl AiMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiRequest {
    pub messages: Vec<AiMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<Usage>,
}

/// One streaming update: a text delta, or the terminal `done` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamProgress {
    pub content: Option<String>,
    pub done: bool,
}

impl StreamProgress {
    pub fn delta(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            done: false,
        }
    }

    pub fn finished() -> Self {
        Self {
            content: None,
            done: true,
        }
    }
}

pub type ProgressFn<'a> = &'a (dyn Fn(StreamProgress) + Send + Sync);

// ────────────────────────────────────────────────────────────────────────────
// Provider trait and factory
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait AiProvider: Send + Sync {
    fn provider_type(&self) -> ProviderType;

    async fn generate(&self, request: &AiRequest) -> Result<AiResponse, AiError>;

    /// Streams the completion through `on_progress` and returns the full text.
    async fn generate_stream(
        &self,
        request: &AiRequest,
        on_progress: ProgressFn<'_>,
    ) -> Result<String, AiError>;

    /// Sends a tiny request to prove URL, key and model work together.
    async fn test_connection(&self) -> Result<(), AiError>;

    async fn fetch_models(&self) -> Vec<String>;
}

/// Everything needed to talk to one backend, tagged by `providerType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "providerType", rename_all_fields = "camelCase")]
pub enum ProviderConfig {
    #[serde(rename = "openai-compatible")]
    OpenAiCompatible {
        base_url: String,
        api_key: String,
        model: String,
    },
    #[serde(rename = "gemini")]
    Gemini {
        api_key: String,
        model: String,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl ProviderConfig {
    /// Gemini always talks to Google's endpoint; the settings URL is only used
    /// by OpenAI-compatible servers.
    pub fn from_settings(settings: &AiSettings) -> Self {
        match settings.provider_type {
            ProviderType::OpenAiCompatible => ProviderConfig::OpenAiCompatible {
                base_url: settings.api_url.trim().to_string(),
                api_key: settings.api_key.trim().to_string(),
                model: settings.model.trim().to_string(),
            },
            ProviderType::Gemini => ProviderConfig::Gemini {
                api_key: settings.api_key.trim().to_string(),
                model: settings.model.trim().to_string(),
                base_url: None,
            },
        }
    }
}

pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn AiProvider>, AiError> {
    Ok(match config {
        ProviderConfig::OpenAiCompatible {
            base_url,
            api_key,
            model,
        } => Box::new(OpenAiClient::new(base_url, api_key, model)?),
        ProviderConfig::Gemini {
            api_key,
            model,
            base_url,
        } => Box::new(GeminiClient::new(api_key, model, base_url.as_deref())?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_config_is_tagged_by_provider_type() {
        let config: ProviderConfig = serde_json::from_str(
            r#"{"providerType":"gemini","apiKey":"k","model":"gemini-2.5-flash"}"#,
        )
        .unwrap();
        assert_eq!(
            config,
            ProviderConfig::Gemini {
                api_key: "k".to_string(),
                model: "gemini-2.5-flash".to_string(),
                base_url: None,
            }
        );
    }

    #[test]
    fn test_from_settings_picks_backend() {
        let mut settings = AiSettings::default();
        let config = ProviderConfig::from_settings(&settings);
        assert!(matches!(config, ProviderConfig::OpenAiCompatible { ref base_url, .. } if base_url == "http://localhost:1234"));

        settings.provider_type = ProviderType::Gemini;
        let config = ProviderConfig::from_settings(&settings);
        assert!(matches!(config, ProviderConfig::Gemini { base_url: None, .. }));
    }

    #[test]
    fn test_factory_returns_matching_provider() {
        let provider = create_provider(&ProviderConfig::Gemini {
            api_key: "k".to_string(),
            model: "gemini-2.5-pro".to_string(),
            base_url: None,
        })
        .unwrap();
        assert_eq!(provider.provider_type(), ProviderType::Gemini);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AiError::Timeout.code(), "timeout");
        assert_eq!(AiError::SafetyFilter.code(), "safety_filter");
        let err = AiError::Api {
            status: Some(401),
            code: Some("invalid_api_key".to_string()),
            kind: None,
            message: "Invalid API key".to_string(),
        };
        assert_eq!(err.code(), "invalid_api_key");
        assert_eq!(err.to_string(), "Invalid API key");
    }
}
