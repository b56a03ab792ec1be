//! Thread events from the Codex CLI event stream.
//!
//! The CLI emits newline-delimited JSON, one event object per line,
//! discriminated by a `type` field. Events with an unrecognized
//! discriminator are carried through as [`ThreadEvent::Other`] so that new
//! event kinds never break an existing consumer.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::items::ThreadItem;
use super::usage::Usage;
use crate::{Error, Result};

/// One event of the thread event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ThreadEvent {
    /// The agent opened (or resumed) a conversation and assigned its ID.
    ThreadStarted {
        /// Opaque conversation identifier assigned by the agent.
        thread_id: String,
    },
    /// A turn began.
    TurnStarted,
    /// An item finished and will not change again.
    ItemCompleted { item: ThreadItem },
    /// The turn ended successfully. Terminal.
    TurnCompleted { usage: Usage },
    /// The turn ended with an agent-reported failure. Terminal.
    TurnFailed { error: ThreadError },
    /// An event kind this library does not know about yet.
    Other(Value),
}

/// Error payload of a `turn.failed` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadError {
    pub message: String,
}

#[derive(Deserialize)]
struct ThreadStartedPayload {
    thread_id: String,
}

#[derive(Deserialize)]
struct ItemCompletedPayload {
    item: ThreadItem,
}

#[derive(Deserialize)]
struct TurnCompletedPayload {
    usage: Usage,
}

#[derive(Deserialize)]
struct TurnFailedPayload {
    error: ThreadError,
}

impl ThreadEvent {
    /// Parse one stdout line as an event.
    ///
    /// A line that is not valid JSON, or that carries a known discriminator
    /// with an invalid payload, fails with [`Error::MalformedEvent`] naming
    /// the line verbatim. Unknown discriminators are not an error.
    pub fn decode(line: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(line).map_err(|err| Error::malformed_event(err, line))?;
        classify(value).map_err(|err| Error::malformed_event(err, line))
    }

    /// Check if this event terminates a turn.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ThreadEvent::TurnCompleted { .. } | ThreadEvent::TurnFailed { .. }
        )
    }

    /// Get the completed item if this is an `item.completed` event.
    pub fn as_item(&self) -> Option<&ThreadItem> {
        match self {
            ThreadEvent::ItemCompleted { item } => Some(item),
            _ => None,
        }
    }

    fn to_wire_value(&self) -> Value {
        match self {
            ThreadEvent::ThreadStarted { thread_id } => {
                json!({"type": "thread.started", "thread_id": thread_id})
            }
            ThreadEvent::TurnStarted => json!({"type": "turn.started"}),
            ThreadEvent::ItemCompleted { item } => {
                json!({"type": "item.completed", "item": item})
            }
            ThreadEvent::TurnCompleted { usage } => {
                json!({"type": "turn.completed", "usage": usage})
            }
            ThreadEvent::TurnFailed { error } => {
                json!({"type": "turn.failed", "error": error})
            }
            ThreadEvent::Other(value) => value.clone(),
        }
    }
}

fn classify(value: Value) -> serde_json::Result<ThreadEvent> {
    let Some(tag) = value.get("type").and_then(Value::as_str) else {
        return Ok(ThreadEvent::Other(value));
    };
    match tag {
        "thread.started" => {
            let payload: ThreadStartedPayload = serde_json::from_value(value)?;
            Ok(ThreadEvent::ThreadStarted {
                thread_id: payload.thread_id,
            })
        }
        "turn.started" => Ok(ThreadEvent::TurnStarted),
        "item.completed" => {
            let payload: ItemCompletedPayload = serde_json::from_value(value)?;
            Ok(ThreadEvent::ItemCompleted {
                item: payload.item,
            })
        }
        "turn.completed" => {
            let payload: TurnCompletedPayload = serde_json::from_value(value)?;
            Ok(ThreadEvent::TurnCompleted {
                usage: payload.usage,
            })
        }
        "turn.failed" => {
            let payload: TurnFailedPayload = serde_json::from_value(value)?;
            Ok(ThreadEvent::TurnFailed {
                error: payload.error,
            })
        }
        _ => Ok(ThreadEvent::Other(value)),
    }
}

impl<'de> Deserialize<'de> for ThreadEvent {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        classify(value).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ThreadEvent {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_wire_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::items::AgentMessageItem;

    #[test]
    fn decode_thread_started() {
        let event =
            ThreadEvent::decode(r#"{"type": "thread.started", "thread_id": "thread-1"}"#).unwrap();
        assert_eq!(
            event,
            ThreadEvent::ThreadStarted {
                thread_id: "thread-1".into()
            }
        );
        assert!(!event.is_terminal());
    }

    #[test]
    fn decode_turn_started() {
        let event = ThreadEvent::decode(r#"{"type": "turn.started"}"#).unwrap();
        assert_eq!(event, ThreadEvent::TurnStarted);
    }

    #[test]
    fn decode_item_completed() {
        let event = ThreadEvent::decode(
            r#"{"type": "item.completed", "item": {"id": "item-1", "type": "agent_message", "text": "Hi!"}}"#,
        )
        .unwrap();
        let item = event.as_item().expect("should carry an item");
        assert_eq!(item.as_agent_message().unwrap().text, "Hi!");
    }

    #[test]
    fn decode_turn_completed() {
        let event = ThreadEvent::decode(
            r#"{"type": "turn.completed", "usage": {"cached_input_tokens": 1, "input_tokens": 2, "output_tokens": 3}}"#,
        )
        .unwrap();
        match event {
            ThreadEvent::TurnCompleted { usage } => {
                assert_eq!(usage.cached_input_tokens, 1);
                assert_eq!(usage.input_tokens, 2);
                assert_eq!(usage.output_tokens, 3);
            }
            other => panic!("expected TurnCompleted, got {other:?}"),
        }
    }

    #[test]
    fn decode_turn_failed() {
        let event =
            ThreadEvent::decode(r#"{"type": "turn.failed", "error": {"message": "boom"}}"#)
                .unwrap();
        assert!(event.is_terminal());
        assert!(matches!(
            event,
            ThreadEvent::TurnFailed { error } if error.message == "boom"
        ));
    }

    #[test]
    fn unknown_discriminator_passes_through() {
        let line = r#"{"type": "session.metrics", "elapsed_ms": 120}"#;
        let event = ThreadEvent::decode(line).unwrap();
        match event {
            ThreadEvent::Other(value) => {
                assert_eq!(value["type"], "session.metrics");
                assert_eq!(value["elapsed_ms"], 120);
            }
            other => panic!("expected Other, got {other:?}"),
        }
    }

    #[test]
    fn missing_discriminator_passes_through() {
        let event = ThreadEvent::decode(r#"{"weird": true}"#).unwrap();
        assert!(matches!(event, ThreadEvent::Other(_)));
    }

    #[test]
    fn invalid_json_names_the_line() {
        let err = ThreadEvent::decode("definitely not json").unwrap_err();
        match err {
            Error::MalformedEvent { line, .. } => assert_eq!(line, "definitely not json"),
            other => panic!("expected MalformedEvent, got {other:?}"),
        }
    }

    #[test]
    fn known_tag_with_bad_payload_is_malformed() {
        // thread.started requires a thread_id
        let err = ThreadEvent::decode(r#"{"type": "thread.started"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedEvent { .. }));
    }

    #[test]
    fn serialize_roundtrip() {
        let events = vec![
            ThreadEvent::ThreadStarted {
                thread_id: "thread-1".into(),
            },
            ThreadEvent::TurnStarted,
            ThreadEvent::ItemCompleted {
                item: ThreadItem::AgentMessage(AgentMessageItem {
                    id: "item-1".into(),
                    text: "Hi!".into(),
                }),
            },
            ThreadEvent::TurnCompleted {
                usage: Usage {
                    cached_input_tokens: 1,
                    input_tokens: 2,
                    output_tokens: 3,
                },
            },
            ThreadEvent::TurnFailed {
                error: ThreadError {
                    message: "boom".into(),
                },
            },
        ];
        for event in events {
            let line = serde_json::to_string(&event).unwrap();
            let parsed = ThreadEvent::decode(&line).unwrap();
            assert_eq!(event, parsed);
        }
    }

    #[test]
    fn events_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ThreadEvent>();
        assert_send_sync::<ThreadError>();
    }
}
