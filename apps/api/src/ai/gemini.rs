//! Native client for Google's Gemini `generateContent` API.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ai::retry::RetryPolicy;
use crate::ai::sse::SseBuffer;
use crate::ai::{
    AiError, AiMessage, AiProvider, AiRequest, AiResponse, ProgressFn, Role, StreamProgress,
    Usage, REQUEST_TIMEOUT,
};
use crate::models::settings::ProviderType;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini has no model listing endpoint usable with a plain API key.
pub const GEMINI_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

const API_KEY_HEADER: &str = "x-goog-api-key";

const UNREACHABLE: &str = "Unable to connect to Gemini API. Please check your internet connection.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

impl GeminiResponse {
    fn first_text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default()
    }

    fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
    }
}

/// System messages move to `systemInstruction`; `assistant` turns become `model`.
fn build_request(request: &AiRequest) -> GeminiRequest {
    let system_parts: Vec<GeminiPart> = request
        .messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| GeminiPart {
            text: m.content.clone(),
        })
        .collect();

    let contents = request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| GeminiContent {
            role: Some(
                match m.role {
                    Role::Assistant => "model",
                    _ => "user",
                }
                .to_string(),
            ),
            parts: vec![GeminiPart {
                text: m.content.clone(),
            }],
        })
        .collect();

    GeminiRequest {
        contents,
        generation_config: GenerationConfig {
            temperature: request.temperature,
            top_p: request.top_p,
            max_output_tokens: request.max_tokens,
        },
        system_instruction: (!system_parts.is_empty()).then_some(SystemInstruction {
            parts: system_parts,
        }),
    }
}

/// Maps the finish reason of an empty stream to the matching error.
fn empty_stream_error(finish_reason: Option<&str>) -> AiError {
    match finish_reason {
        Some("MAX_TOKENS") => AiError::MaxTokensExceeded(
            "Response exceeded max tokens. The model ran out of space to generate content. \
             Try a simpler prompt or increase maxTokens."
                .to_string(),
        ),
        Some("SAFETY") => AiError::SafetyFilter,
        Some("RECITATION") => AiError::RecitationBlocked,
        other => AiError::EmptyResponse(format!(
            "Gemini generated an empty response (finish_reason: {}). Please try again.",
            other.unwrap_or("unknown")
        )),
    }
}

async fn error_from_response(response: Response) -> AiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let fallback = format!("Gemini API request failed with status {status}");

    let (message, kind) = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(ErrorEnvelope { error }) => (
            error
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(fallback),
            error.status,
        ),
        Err(_) => (fallback, None),
    };

    AiError::Api {
        status: Some(status),
        code: None,
        kind,
        message,
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str, base_url: Option<&str>) -> Result<Self, AiError> {
        Ok(Self {
            http: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: base_url
                .map(|b| b.trim().trim_end_matches('/'))
                .filter(|b| !b.is_empty())
                .unwrap_or(DEFAULT_BASE_URL)
                .to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    #[cfg(test)]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The key travels in the `x-goog-api-key` header and never appears in the URL.
    fn endpoint(&self, streaming: bool) -> String {
        if streaming {
            format!(
                "{}/models/{}:streamGenerateContent?alt=sse",
                self.base_url, self.model
            )
        } else {
            format!("{}/models/{}:generateContent", self.base_url, self.model)
        }
    }

    async fn post(&self, request: &AiRequest, streaming: bool) -> Result<Response, AiError> {
        let body = build_request(request);
        let url = self.endpoint(streaming);

        let response = self
            .retry
            .send("Gemini", || {
                self.http
                    .post(&url)
                    .header(API_KEY_HEADER, &self.api_key)
                    .json(&body)
            })
            .await
            .map_err(|e| AiError::transport(e, UNREACHABLE))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response)
    }
}

#[async_trait]
impl AiProvider for GeminiClient {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Gemini
    }

    async fn generate(&self, request: &AiRequest) -> Result<AiResponse, AiError> {
        let response = self.post(request, false).await?;
        let body = response
            .text()
            .await
            .map_err(|e| AiError::transport(e, UNREACHABLE))?;
        let data: GeminiResponse = serde_json::from_str(&body)?;

        let content = data.first_text().trim().to_string();
        if content.is_empty() {
            return Err(match data.finish_reason() {
                Some("MAX_TOKENS") => AiError::MaxTokensExceeded(
                    "Response exceeded max tokens (likely due to thinking mode). \
                     Try increasing maxTokens or using a simpler prompt."
                        .to_string(),
                ),
                _ => AiError::EmptyResponse(
                    "Gemini generated an empty response. Please try again.".to_string(),
                ),
            });
        }

        let usage = data.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });
        if let Some(usage) = &usage {
            debug!(
                "Gemini call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(AiResponse {
            content,
            model: data.model_version.unwrap_or_else(|| self.model.clone()),
            usage,
        })
    }

    async fn generate_stream(
        &self,
        request: &AiRequest,
        on_progress: ProgressFn<'_>,
    ) -> Result<String, AiError> {
        let response = self.post(request, true).await?;

        let mut stream = response.bytes_stream();
        let mut buffer = SseBuffer::new();
        let mut full = String::new();
        let mut last_finish_reason: Option<String> = None;

        let mut handle = |payload: String, full: &mut String| {
            match serde_json::from_str::<GeminiResponse>(&payload) {
                Ok(chunk) => {
                    let text = chunk.first_text();
                    if !text.is_empty() {
                        full.push_str(&text);
                        on_progress(StreamProgress::delta(text));
                    }
                    if let Some(reason) = chunk.finish_reason() {
                        debug!("Gemini finish reason: {reason}");
                        last_finish_reason = Some(reason.to_string());
                    }
                }
                Err(e) => warn!("Skipping unparsable Gemini chunk ({e}): {payload}"),
            }
        };

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| AiError::transport(e, UNREACHABLE))?;
            for payload in buffer.push(&chunk) {
                handle(payload, &mut full);
            }
        }
        if let Some(payload) = buffer.finish() {
            handle(payload, &mut full);
        }
        on_progress(StreamProgress::finished());

        if full.trim().is_empty() {
            return Err(empty_stream_error(last_finish_reason.as_deref()));
        }

        info!(
            "Gemini streaming complete: {} chars (finish_reason: {})",
            full.len(),
            last_finish_reason.as_deref().unwrap_or("STOP")
        );
        Ok(full)
    }

    async fn test_connection(&self) -> Result<(), AiError> {
        let request = AiRequest {
            messages: vec![AiMessage::user("Hi")],
            temperature: Some(0.1),
            max_tokens: Some(100),
            top_p: None,
        };
        self.generate(&request).await.map(|_| ())
    }

    async fn fetch_models(&self) -> Vec<String> {
        GEMINI_MODELS.iter().map(|m| m.to_string()).collect()
    }
}
