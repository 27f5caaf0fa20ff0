//! OpenAI-compatible API adapter
//!
//! Talks to Ollama's `/v1/chat/completions` endpoint. Sampling controls are
//! top-level OpenAI parameter names (`max_tokens` for the cap, omitted when
//! unbounded), and streaming responses arrive as SSE `data:` events
//! terminated by a `[DONE]` marker. The marker is consumed here, never
//! relayed to the caller.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use reqwest::{header, Client};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    chat::{ChatMessage, ChatRequest},
    error::{RelayError, Result},
};

use super::{streaming::SseParser, ChatBackend, FragmentStream, SamplingDefaults};

/// Defaults applied when the caller omits a sampling field
///
/// `max_tokens: None` means the field is left out of the upstream request so
/// generation runs unbounded, matching the OpenAI client default.
pub const OPENAI_DEFAULTS: SamplingDefaults = SamplingDefaults {
    temperature: 0.7,
    top_p: 1.0,
    max_tokens: None,
    presence_penalty: 0.0,
    frequency_penalty: 0.0,
};

/// OpenAI-compatible backend adapter
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
}

impl OpenAiBackend {
    /// Create a new adapter against the given Ollama base URL
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Ollama accepts any non-empty bearer token on its OpenAI surface
        let client = Client::builder()
            .timeout(timeout)
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    "Authorization",
                    header::HeaderValue::from_static("Bearer ollama"),
                );
                headers
            })
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Build the chat-completions body from the inbound request plus defaults
    fn build_request(request: &ChatRequest, stream: bool) -> CompletionsBody {
        CompletionsBody {
            model: request.model.clone(),
            messages: request.messages.clone(),
            stream,
            temperature: request.temperature.unwrap_or(OPENAI_DEFAULTS.temperature),
            top_p: request.top_p.unwrap_or(OPENAI_DEFAULTS.top_p),
            max_tokens: request.max_completion_tokens.or(OPENAI_DEFAULTS.max_tokens),
            presence_penalty: request
                .presence_penalty
                .unwrap_or(OPENAI_DEFAULTS.presence_penalty),
            frequency_penalty: request
                .frequency_penalty
                .unwrap_or(OPENAI_DEFAULTS.frequency_penalty),
        }
    }

    async fn send(&self, body: &CompletionsBody) -> Result<reqwest::Response> {
        debug!(model = %body.model, stream = body.stream, "calling ollama /v1/chat/completions");

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::BackendApi { status, body });
        }

        Ok(response)
    }

    /// Turn the SSE byte stream into a fragment stream
    fn process_stream(
        byte_stream: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    ) -> impl Stream<Item = Result<Value>> + Send + 'static {
        async_stream::stream! {
            let mut parser = SseParser::new();
            let mut byte_stream = Box::pin(byte_stream);

            while let Some(chunk_result) = byte_stream.next().await {
                match chunk_result {
                    Ok(bytes) => {
                        let text = match std::str::from_utf8(&bytes) {
                            Ok(t) => t,
                            Err(e) => {
                                yield Err(RelayError::Other(format!("invalid UTF-8 in stream: {e}")));
                                return;
                            }
                        };

                        for event in parser.parse_chunk(text) {
                            if event.is_done_marker() {
                                return;
                            }
                            match serde_json::from_str::<Value>(&event.data) {
                                Ok(fragment) => yield Ok(fragment),
                                Err(e) => {
                                    yield Err(RelayError::Other(format!("invalid SSE payload: {e}")));
                                    return;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(RelayError::Http(e));
                        return;
                    }
                }
            }

            // A final event may arrive without a terminating blank line
            if let Some(event) = parser.flush() {
                if !event.is_done_marker() {
                    match serde_json::from_str::<Value>(&event.data) {
                        Ok(fragment) => yield Ok(fragment),
                        Err(e) => yield Err(RelayError::Other(format!("invalid SSE payload: {e}"))),
                    }
                }
            }
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    fn welcome(&self) -> &'static str {
        "Welcome to the Ollama (via OpenAI API) Server!"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<Value> {
        let body = Self::build_request(request, false);
        let response = self.send(&body).await?;
        Ok(response.json().await?)
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<FragmentStream> {
        let body = Self::build_request(request, true);
        let response = self.send(&body).await?;

        Ok(Box::pin(Self::process_stream(response.bytes_stream())))
    }
}

// OpenAI API request types

#[derive(Debug, Clone, Serialize)]
struct CompletionsBody {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    temperature: f64,
    top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    presence_penalty: f64,
    frequency_penalty: f64,
}
