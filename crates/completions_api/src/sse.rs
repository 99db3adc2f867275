use serde_json::Value;

use crate::events::{CompletionStreamEvent, FinishReason};

/// Incremental parser for chat-completions SSE streams.
#[derive(Debug, Default)]
pub struct SseStreamParser {
    buffer: String,
}

impl SseStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete events.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<CompletionStreamEvent> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
        let mut events = Vec::new();

        while let Some(split) = self.buffer.find("\n\n") {
            let frame = self.buffer[..split].to_string();
            self.buffer.drain(0..split + 2);

            if let Some(payload) = extract_data_payload(&frame) {
                if payload == "[DONE]" || payload.is_empty() {
                    continue;
                }

                if let Ok(value) = serde_json::from_str::<Value>(&payload) {
                    events.extend(map_events(&value));
                }
            }
        }

        events
    }

    /// Parse a complete SSE payload string in one shot.
    pub fn parse_frames(input: &str) -> Vec<CompletionStreamEvent> {
        let mut parser = Self::default();
        parser.feed(input.as_bytes())
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty()
    }
}

fn extract_data_payload(frame: &str) -> Option<String> {
    let data_lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect();

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

/// Maps one chunk object to normalized events.
///
/// A single chunk can carry both a content fragment and a finish reason;
/// the delta is emitted before the completion marker.
fn map_events(value: &Value) -> Vec<CompletionStreamEvent> {
    if let Some(error) = value.get("error") {
        let code = error
            .get("code")
            .filter(|code| !code.is_null())
            .map(|code| match code {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .filter(|value| !value.is_empty());
        let message = error
            .get("message")
            .and_then(|value| value.as_str())
            .map(ToString::to_string);
        return vec![CompletionStreamEvent::Error { code, message }];
    }

    let Some(choice) = value
        .get("choices")
        .and_then(|choices| choices.as_array())
        .and_then(|choices| choices.first())
    else {
        return Vec::new();
    };

    let mut events = Vec::new();

    if let Some(delta) = choice
        .get("delta")
        .and_then(|delta| delta.get("content"))
        .and_then(|content| content.as_str())
    {
        if !delta.is_empty() {
            events.push(CompletionStreamEvent::ContentDelta {
                delta: delta.to_owned(),
            });
        }
    }

    if let Some(finish) = choice.get("finish_reason").and_then(|value| value.as_str()) {
        events.push(CompletionStreamEvent::Completed {
            finish_reason: FinishReason::parse(finish),
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use crate::events::{CompletionStreamEvent, FinishReason};

    use super::SseStreamParser;

    #[test]
    fn parses_sse_frames_incrementally() {
        let mut parser = SseStreamParser::default();
        let mut events = Vec::new();

        events.extend(parser.feed(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"},\"finish_reason\":null}]}\n\n",
        ));
        assert_eq!(
            events,
            vec![CompletionStreamEvent::ContentDelta {
                delta: "Hello".to_string(),
            }]
        );

        events.extend(parser.feed(b"data: [DONE]\n\n"));
        assert_eq!(events.len(), 1);
        assert!(parser.is_empty_buffer());
    }

    #[test]
    fn frames_split_across_feeds_are_reassembled() {
        let mut parser = SseStreamParser::default();

        let first = parser.feed(b"data: {\"choices\":[{\"delta\":{\"con");
        assert!(first.is_empty());

        let second = parser.feed(b"tent\":\"hi\"},\"finish_reason\":null}]}\n\n");
        assert_eq!(
            second,
            vec![CompletionStreamEvent::ContentDelta {
                delta: "hi".to_string(),
            }]
        );
    }

    #[test]
    fn finish_reason_chunk_emits_completed() {
        let events = SseStreamParser::parse_frames(
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        );

        assert_eq!(
            events,
            vec![CompletionStreamEvent::Completed {
                finish_reason: Some(FinishReason::Stop),
            }]
        );
    }

    #[test]
    fn content_and_finish_in_one_chunk_emit_delta_first() {
        let events = SseStreamParser::parse_frames(
            "data: {\"choices\":[{\"delta\":{\"content\":\"bye\"},\"finish_reason\":\"stop\"}]}\n\n",
        );

        assert_eq!(
            events,
            vec![
                CompletionStreamEvent::ContentDelta {
                    delta: "bye".to_string(),
                },
                CompletionStreamEvent::Completed {
                    finish_reason: Some(FinishReason::Stop),
                },
            ]
        );
    }

    #[test]
    fn error_payloads_map_to_error_events() {
        let events = SseStreamParser::parse_frames(
            "data: {\"error\":{\"message\":\"insufficient quota\",\"code\":\"insufficient_quota\"}}\n\n",
        );

        assert_eq!(
            events,
            vec![CompletionStreamEvent::Error {
                code: Some("insufficient_quota".to_string()),
                message: Some("insufficient quota".to_string()),
            }]
        );
    }

    #[test]
    fn unknown_chunks_are_ignored() {
        let events = SseStreamParser::parse_frames("data: {\"object\":\"ping\"}\n\n");
        assert!(events.is_empty());
    }
}
