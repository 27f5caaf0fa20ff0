//! Backend adapters for the local Ollama server
//!
//! Two adapters expose the same interface over different upstream dialects:
//! - [`ollama::OllamaBackend`] — Ollama's native `/api/chat` API
//! - [`openai::OpenAiBackend`] — Ollama's OpenAI-compatible
//!   `/v1/chat/completions` API

pub mod ollama;
pub mod openai;
pub mod streaming;

use std::{pin::Pin, sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::Stream;

use crate::{
    chat::ChatRequest,
    config::{Dialect, RelaySettings},
    error::Result,
};

/// One incremental unit of a streamed generation response, relayed opaquely
pub type Fragment = serde_json::Value;

/// Pull-based stream of response fragments, in backend arrival order
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment>> + Send>>;

/// Core trait for chat backends
///
/// Stateless from the proxy's perspective: one request in, one response (or
/// one fragment stream) out, nothing cached across calls.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Dialect name (e.g. "ollama", "openai")
    fn name(&self) -> &str;

    /// Welcome message served on the root route
    fn welcome(&self) -> &'static str;

    /// Issue one blocking chat call and return the complete backend reply
    async fn chat(&self, request: &ChatRequest) -> Result<Fragment>;

    /// Issue one streaming chat call and return the fragment stream
    async fn chat_stream(&self, request: &ChatRequest) -> Result<FragmentStream>;
}

/// Fixed per-adapter defaults for sampling controls absent from the request
#[derive(Debug, Clone, Copy)]
pub struct SamplingDefaults {
    pub temperature: f64,
    pub top_p: f64,
    /// Max-token cap; `None` means unbounded (field omitted upstream)
    pub max_tokens: Option<u32>,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
}

/// Create the configured backend adapter
///
/// # Errors
///
/// Returns an error if the reqwest client cannot be constructed.
pub fn create(settings: &RelaySettings) -> Result<Arc<dyn ChatBackend>> {
    let timeout = Duration::from_secs(settings.timeout_secs);
    match settings.dialect {
        Dialect::Native => Ok(Arc::new(ollama::OllamaBackend::new(
            settings.backend_url_trimmed(),
            timeout,
        )?)),
        Dialect::Openai => Ok(Arc::new(openai::OpenAiBackend::new(
            settings.backend_url_trimmed(),
            timeout,
        )?)),
    }
}
