use serde::{Deserialize, Serialize};

/// Reason reported by the endpoint for ending a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
}

impl FinishReason {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "content_filter" => Self::ContentFilter,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ContentFilter => "content_filter",
        }
    }
}

/// Stream event emitted by the SSE parser after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionStreamEvent {
    /// One `choices[0].delta.content` fragment.
    ContentDelta { delta: String },
    /// A non-null `choices[0].finish_reason`; terminates the completion.
    Completed { finish_reason: Option<FinishReason> },
    /// An in-stream `{"error": ...}` payload.
    Error {
        code: Option<String>,
        message: Option<String>,
    },
}

impl CompletionStreamEvent {
    /// Returns true when this event terminates the completion lifecycle.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::{CompletionStreamEvent, FinishReason};

    #[test]
    fn finish_reason_round_trips_known_values() {
        for reason in [
            FinishReason::Stop,
            FinishReason::Length,
            FinishReason::ContentFilter,
        ] {
            assert_eq!(FinishReason::parse(reason.as_str()), Some(reason));
        }
        assert_eq!(FinishReason::parse("tool_calls"), None);
    }

    #[test]
    fn terminal_detection_matches_lifecycle() {
        assert!(!CompletionStreamEvent::ContentDelta {
            delta: "hi".to_string(),
        }
        .is_terminal());
        assert!(CompletionStreamEvent::Completed {
            finish_reason: Some(FinishReason::Stop),
        }
        .is_terminal());
        assert!(CompletionStreamEvent::Error {
            code: None,
            message: Some("boom".to_string()),
        }
        .is_terminal());
    }
}
