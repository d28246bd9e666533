//! Client for any server speaking the OpenAI chat completions protocol
//! (OpenAI, OpenRouter, Groq, LM Studio, ...).

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::ai::sse::SseBuffer;
use crate::ai::{
    AiError, AiMessage, AiProvider, AiRequest, AiResponse, ProgressFn, StreamProgress, Usage,
    REQUEST_TIMEOUT,
};
use crate::models::settings::ProviderType;
use crate::settings::presets;

const UNREACHABLE: &str =
    "Unable to connect to AI server. Please check the URL and ensure the server is running.";
const EMPTY_RESPONSE: &str = "AI generated an empty response. Please try again.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [AiMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    model: Option<String>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self, AiError> {
        Ok(Self {
            http: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Preset URLs already end in `/v1`; bare host URLs (the local default) do not.
    fn endpoint(&self, path: &str) -> String {
        if self.base_url.ends_with("/v1") {
            format!("{}/{path}", self.base_url)
        } else {
            format!("{}/v1/{path}", self.base_url)
        }
    }

    async fn post_chat(&self, request: &AiRequest, stream: bool) -> Result<Response, AiError> {
        let body = ChatRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: request.top_p,
            stream,
        };

        let response = self
            .http
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::transport(e, UNREACHABLE))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response)
    }
}

async fn error_from_response(response: Response) -> AiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let fallback = format!("API request failed with status {status}");

    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(ErrorEnvelope { error }) => AiError::Api {
            status: Some(status),
            code: error.code.map(|c| match c {
                Value::String(s) => s,
                other => other.to_string(),
            }),
            kind: error.kind,
            message: error
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(fallback),
        },
        Err(_) => AiError::Api {
            status: Some(status),
            code: None,
            kind: None,
            message: fallback,
        },
    }
}

#[async_trait]
impl AiProvider for OpenAiClient {
    fn provider_type(&self) -> ProviderType {
        ProviderType::OpenAiCompatible
    }

    async fn generate(&self, request: &AiRequest) -> Result<AiResponse, AiError> {
        let response = self.post_chat(request, false).await?;
        let body = response
            .text()
            .await
            .map_err(|e| AiError::transport(e, UNREACHABLE))?;
        let chat: ChatResponse = serde_json::from_str(&body)?;

        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AiError::EmptyResponse(EMPTY_RESPONSE.to_string()))?;

        let content = choice.message.content.unwrap_or_default();
        if content.trim().is_empty() {
            return Err(AiError::EmptyContent);
        }

        if let Some(usage) = &chat.usage {
            debug!(
                "Chat completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(AiResponse {
            content,
            model: chat.model.unwrap_or_else(|| self.model.clone()),
            usage: chat.usage,
        })
    }

    async fn generate_stream(
        &self,
        request: &AiRequest,
        on_progress: ProgressFn<'_>,
    ) -> Result<String, AiError> {
        let response = self.post_chat(request, true).await?;

        let mut stream = response.bytes_stream();
        let mut buffer = SseBuffer::new();
        let mut full = String::new();

        'read: while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| AiError::transport(e, UNREACHABLE))?;
            for payload in buffer.push(&chunk) {
                if payload == "[DONE]" {
                    break 'read;
                }
                match serde_json::from_str::<StreamChunk>(&payload) {
                    Ok(parsed) => {
                        let text = parsed
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|c| c.delta.content)
                            .unwrap_or_default();
                        if !text.is_empty() {
                            full.push_str(&text);
                            on_progress(StreamProgress::delta(text));
                        }
                    }
                    Err(e) => warn!("Skipping unparsable stream chunk ({e}): {payload}"),
                }
            }
        }
        on_progress(StreamProgress::finished());

        if full.trim().is_empty() {
            return Err(AiError::EmptyResponse(EMPTY_RESPONSE.to_string()));
        }
        info!("Chat completion stream finished: {} chars", full.len());
        Ok(full)
    }

    async fn test_connection(&self) -> Result<(), AiError> {
        let request = AiRequest {
            messages: vec![AiMessage::user("Hello")],
            max_tokens: Some(5),
            ..Default::default()
        };
        self.post_chat(&request, false).await.map(|_| ())
    }

    /// Falls back to the matching preset's common models when the server
    /// does not list models.
    async fn fetch_models(&self) -> Vec<String> {
        let fallback = || -> Vec<String> {
            presets::find_by_url(&self.base_url)
                .map(|p| p.common_models.iter().map(|m| m.to_string()).collect())
                .unwrap_or_default()
        };

        let response = match self
            .http
            .get(self.endpoint("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!("Model list request returned {}", r.status());
                return fallback();
            }
            Err(e) => {
                warn!("Model list request failed: {e}");
                return fallback();
            }
        };

        match response.json::<ModelList>().await {
            Ok(list) if !list.data.is_empty() => list.data.into_iter().map(|m| m.id).collect(),
            Ok(_) => fallback(),
            Err(e) => {
                warn!("Unreadable model list: {e}");
                fallback()
            }
        }
    }
}
