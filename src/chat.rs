//! Chat request/response data model
//!
//! The inbound payload is a generic chat-completion request. Adapters derive
//! a backend-specific body from it; the inbound value itself is never mutated.

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

/// One entry of the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaker role ("system", "user", "assistant")
    pub role: String,

    /// Message text
    pub content: String,
}

/// Caller-supplied chat-completion request
///
/// `model` and `messages` are required; everything else is optional and
/// filled with per-adapter defaults when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model to run (e.g. "llama3.2")
    #[serde(default)]
    pub model: String,

    /// Ordered conversation history
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    /// Whether to stream the response incrementally
    #[serde(default)]
    pub stream: bool,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Nucleus sampling cutoff
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,

    /// Presence penalty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,

    /// Frequency penalty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
}

impl ChatRequest {
    /// Validate the request before any backend call
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidRequest`] naming the offending field when
    /// `model` is empty or `messages` is empty.
    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            return Err(RelayError::InvalidRequest(
                "Model name ('model') is required".to_string(),
            ));
        }
        if self.messages.is_empty() {
            return Err(RelayError::InvalidRequest(
                "Messages ('messages') must be a non-empty list of chat message objects"
                    .to_string(),
            ));
        }
        Ok(())
    }
}
