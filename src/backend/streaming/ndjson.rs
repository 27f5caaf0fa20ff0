//! Newline-delimited JSON parser
//!
//! Ollama's native `/api/chat` streams one JSON object per line. Chunk
//! boundaries fall anywhere, so partial lines are buffered until the next
//! call.

use serde_json::Value;

use crate::error::{RelayError, Result};

/// Incremental NDJSON parser
#[derive(Default)]
pub struct NdjsonParser {
    line_buffer: String,
}

impl NdjsonParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a chunk, returning the JSON objects completed by it
    ///
    /// # Errors
    ///
    /// Returns an error when a complete line is not valid JSON.
    pub fn parse_chunk(&mut self, chunk: &str) -> Result<Vec<Value>> {
        let mut objects = Vec::new();

        self.line_buffer.push_str(chunk);

        while let Some(line_end) = self.line_buffer.find('\n') {
            let line = self.line_buffer[..line_end]
                .trim_end_matches('\r')
                .to_string();
            self.line_buffer.drain(..=line_end);

            if line.is_empty() {
                continue;
            }

            let value = serde_json::from_str(&line).map_err(|e| {
                RelayError::Other(format!("invalid JSON line in stream: {e}"))
            })?;
            objects.push(value);
        }

        Ok(objects)
    }

    /// Flush a trailing line that was never newline-terminated
    ///
    /// # Errors
    ///
    /// Returns an error when the remaining buffer is not valid JSON.
    pub fn flush(&mut self) -> Result<Option<Value>> {
        let line = std::mem::take(&mut self.line_buffer);
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let value = serde_json::from_str(line)
            .map_err(|e| RelayError::Other(format!("invalid JSON line in stream: {e}")))?;
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_complete_lines() {
        let mut parser = NdjsonParser::new();
        let objects = parser
            .parse_chunk("{\"a\":1}\n{\"a\":2}\n")
            .unwrap();

        assert_eq!(objects, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut parser = NdjsonParser::new();

        assert!(parser.parse_chunk("{\"done\":").unwrap().is_empty());

        let objects = parser.parse_chunk("false}\n").unwrap();
        assert_eq!(objects, vec![json!({"done": false})]);
    }

    #[test]
    fn test_skips_blank_lines() {
        let mut parser = NdjsonParser::new();
        let objects = parser.parse_chunk("\n{\"a\":1}\n\n").unwrap();
        assert_eq!(objects.len(), 1);
    }

    #[test]
    fn test_invalid_line_is_an_error() {
        let mut parser = NdjsonParser::new();
        assert!(parser.parse_chunk("not json\n").is_err());
    }

    #[test]
    fn test_flush_trailing_object() {
        let mut parser = NdjsonParser::new();
        assert!(parser.parse_chunk("{\"done\":true}").unwrap().is_empty());

        let value = parser.flush().unwrap().unwrap();
        assert_eq!(value, json!({"done": true}));
    }

    #[test]
    fn test_flush_empty_buffer() {
        let mut parser = NdjsonParser::new();
        assert!(parser.flush().unwrap().is_none());
    }
}
