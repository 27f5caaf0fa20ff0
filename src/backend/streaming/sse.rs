//! Server-Sent Events (SSE) parser
//!
//! Parses the SSE framing used by Ollama's OpenAI-compatible streaming API:
//! `data: <json>` lines separated by blank lines, terminated by a
//! `data: [DONE]` marker.

/// One parsed SSE event
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseEvent {
    /// Event type, when the stream names one
    pub event_type: Option<String>,

    /// Event data (JSON payload)
    pub data: String,
}

impl SseEvent {
    /// Check if the event carries data
    pub fn is_complete(&self) -> bool {
        !self.data.is_empty()
    }

    /// Check if this is the OpenAI end-of-stream marker
    pub fn is_done_marker(&self) -> bool {
        self.data == "[DONE]"
    }
}

/// Incremental SSE parser
///
/// Chunks may split events anywhere; incomplete events are buffered until the
/// next call.
#[derive(Default)]
pub struct SseParser {
    current_event: SseEvent,
    line_buffer: String,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a chunk of SSE bytes, returning the events completed by it
    pub fn parse_chunk(&mut self, chunk: &str) -> Vec<SseEvent> {
        let mut events = Vec::new();

        self.line_buffer.push_str(chunk);

        while let Some(line_end) = self.line_buffer.find('\n') {
            let line = self.line_buffer[..line_end]
                .trim_end_matches('\r')
                .to_string();
            self.line_buffer.drain(..=line_end);

            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }

        events
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        // Blank line terminates the current event
        if line.is_empty() {
            if self.current_event.is_complete() {
                return Some(std::mem::take(&mut self.current_event));
            }
            return None;
        }

        // Comment line
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.find(':') {
            Some(pos) => (&line[..pos], line[pos + 1..].strip_prefix(' ').unwrap_or(&line[pos + 1..])),
            None => (line, ""),
        };

        match field {
            "event" => self.current_event.event_type = Some(value.to_string()),
            "data" => {
                if !self.current_event.data.is_empty() {
                    self.current_event.data.push('\n');
                }
                self.current_event.data.push_str(value);
            }
            _ => {}
        }

        None
    }

    /// Flush a trailing event that was never terminated by a blank line
    pub fn flush(&mut self) -> Option<SseEvent> {
        if !self.line_buffer.is_empty() {
            let line = std::mem::take(&mut self.line_buffer);
            self.process_line(&line);
        }

        if self.current_event.is_complete() {
            Some(std::mem::take(&mut self.current_event))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_event() {
        let mut parser = SseParser::new();
        let events = parser.parse_chunk("data: {\"text\":\"hello\"}\n\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, r#"{"text":"hello"}"#);
    }

    #[test]
    fn test_parse_multiple_events() {
        let mut parser = SseParser::new();
        let events = parser.parse_chunk("data: one\n\ndata: two\n\n");

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, "one");
        assert_eq!(events[1].data, "two");
    }

    #[test]
    fn test_parse_done_marker() {
        let mut parser = SseParser::new();
        let events = parser.parse_chunk("data: [DONE]\n\n");

        assert_eq!(events.len(), 1);
        assert!(events[0].is_done_marker());
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut parser = SseParser::new();

        let events = parser.parse_chunk("data: par");
        assert!(events.is_empty());

        let events = parser.parse_chunk("tial\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "partial");
    }

    #[test]
    fn test_ignore_comments() {
        let mut parser = SseParser::new();
        let events = parser.parse_chunk(": keepalive\ndata: real\n\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "real");
    }

    #[test]
    fn test_named_event_type() {
        let mut parser = SseParser::new();
        let events = parser.parse_chunk("event: message\ndata: body\n\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type.as_deref(), Some("message"));
    }

    #[test]
    fn test_flush_unterminated_event() {
        let mut parser = SseParser::new();
        assert!(parser.parse_chunk("data: tail").is_empty());

        let event = parser.flush().unwrap();
        assert_eq!(event.data, "tail");
    }
}
