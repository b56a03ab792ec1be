//! JSON protocol types for the Codex CLI event stream.
//!
//! This module defines the types for the newline-delimited JSON events the
//! CLI emits in `exec --experimental-json` mode.
//!
//! # Event Types
//!
//! One event object per line, discriminated by `type`:
//!
//! - `thread.started`: the conversation was opened and given an ID
//! - `turn.started`: a turn began
//! - `item.completed`: one [`ThreadItem`] finished
//! - `turn.completed`: terminal success, carries [`Usage`]
//! - `turn.failed`: terminal failure, carries [`ThreadError`]
//!
//! Unknown discriminators decode to [`ThreadEvent::Other`] rather than
//! failing, so new CLI event kinds never break existing consumers.
//!
//! # Example
//!
//! ```
//! use libcodex::protocol::ThreadEvent;
//!
//! let line = r#"{"type": "thread.started", "thread_id": "thread-1"}"#;
//! let event = ThreadEvent::decode(line).unwrap();
//! assert!(matches!(event, ThreadEvent::ThreadStarted { .. }));
//! ```

mod events;
mod items;
mod usage;

// Re-export all public types
pub use events::{ThreadError, ThreadEvent};
pub use items::{
    AgentMessageItem, CommandExecutionItem, ErrorItem, FileChangeItem, FileUpdateChange,
    ItemStatus, McpToolCallError, McpToolCallItem, McpToolCallResult, PatchApplyStatus,
    PatchChangeKind, ReasoningItem, ThreadItem, TodoEntry, TodoListItem, WebSearchItem,
};
pub use usage::Usage;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ThreadEvent>();
        assert_send_sync::<ThreadItem>();
        assert_send_sync::<Usage>();
        assert_send_sync::<ThreadError>();
    }

    #[test]
    fn roundtrip_thread_event() {
        let original = ThreadEvent::ItemCompleted {
            item: ThreadItem::AgentMessage(AgentMessageItem {
                id: "item-1".into(),
                text: "Hello, world!".into(),
            }),
        };

        let json = serde_json::to_string(&original).unwrap();
        let parsed: ThreadEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(original, parsed);
    }
}
