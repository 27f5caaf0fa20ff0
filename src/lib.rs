//! ollama-relay: thin HTTP proxy for a local Ollama server
//!
//! Forwards chat-completion requests to a locally running Ollama instance,
//! speaking either Ollama's native API or its OpenAI-compatible API, and
//! relays streaming responses to the caller as server-sent events.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::too_many_lines)]

pub mod backend;
pub mod chat;
pub mod config;
pub mod error;
pub mod server;

// Re-exports for convenience
pub use error::{RelayError, Result};
