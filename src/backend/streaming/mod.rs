//! Incremental wire-format parsers for streamed backend responses
//!
//! The native dialect streams newline-delimited JSON; the OpenAI-compatible
//! dialect streams Server-Sent Events. Both parsers accept arbitrary chunk
//! boundaries and buffer partial input across calls.

pub mod ndjson;
pub mod sse;

pub use ndjson::NdjsonParser;
pub use sse::{SseEvent, SseParser};
