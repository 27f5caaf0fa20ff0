//! Native Ollama API adapter
//!
//! Talks to Ollama's own `/api/chat` endpoint. Sampling controls travel in an
//! `options` object under Ollama's native names (the max-token cap is
//! `num_predict`), and streaming responses arrive as newline-delimited JSON.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    chat::{ChatMessage, ChatRequest},
    error::{RelayError, Result},
};

use super::{streaming::NdjsonParser, ChatBackend, FragmentStream, SamplingDefaults};

/// Default generation cap (`num_predict`) when the caller sets no limit
pub const NATIVE_NUM_PREDICT: u32 = 1024;

/// Defaults applied when the caller omits a sampling field
pub const NATIVE_DEFAULTS: SamplingDefaults = SamplingDefaults {
    temperature: 0.7,
    top_p: 0.9,
    max_tokens: Some(NATIVE_NUM_PREDICT),
    presence_penalty: 0.0,
    frequency_penalty: 0.0,
};

/// Native Ollama backend adapter
pub struct OllamaBackend {
    client: Client,
    base_url: String,
}

impl OllamaBackend {
    /// Create a new adapter against the given Ollama base URL
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Build the native request body from the inbound request plus defaults
    fn build_request(request: &ChatRequest, stream: bool) -> OllamaChatBody {
        OllamaChatBody {
            model: request.model.clone(),
            messages: request.messages.clone(),
            stream,
            options: OllamaOptions {
                temperature: request.temperature.unwrap_or(NATIVE_DEFAULTS.temperature),
                top_p: request.top_p.unwrap_or(NATIVE_DEFAULTS.top_p),
                num_predict: request
                    .max_completion_tokens
                    .unwrap_or(NATIVE_NUM_PREDICT),
                presence_penalty: request
                    .presence_penalty
                    .unwrap_or(NATIVE_DEFAULTS.presence_penalty),
                frequency_penalty: request
                    .frequency_penalty
                    .unwrap_or(NATIVE_DEFAULTS.frequency_penalty),
            },
        }
    }

    async fn send(&self, body: &OllamaChatBody) -> Result<reqwest::Response> {
        debug!(model = %body.model, stream = body.stream, "calling ollama /api/chat");

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
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

    /// Turn the NDJSON byte stream into a fragment stream
    fn process_stream(
        byte_stream: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    ) -> impl Stream<Item = Result<Value>> + Send + 'static {
        async_stream::stream! {
            let mut parser = NdjsonParser::new();
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

                        match parser.parse_chunk(text) {
                            Ok(fragments) => {
                                for fragment in fragments {
                                    yield Ok(fragment);
                                }
                            }
                            Err(e) => {
                                yield Err(e);
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(RelayError::Http(e));
                        return;
                    }
                }
            }

            match parser.flush() {
                Ok(Some(fragment)) => yield Ok(fragment),
                Ok(None) => {}
                Err(e) => yield Err(e),
            }
        }
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn welcome(&self) -> &'static str {
        "Welcome to the Ollama API Server!"
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

// Native API request types

#[derive(Debug, Clone, Serialize)]
struct OllamaChatBody {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Clone, Serialize)]
struct OllamaOptions {
    temperature: f64,
    top_p: f64,
    num_predict: u32,
    presence_penalty: f64,
    frequency_penalty: f64,
}
