//! Test utilities for libcodex integration tests.

use std::collections::VecDeque;

use libcodex::process::LineSource;
use libcodex::{Error, Result};
use serde_json::{json, Value};

/// A line source that replays pre-defined lines.
///
/// Lines are returned in order, then `Ok(None)` is returned to signal a
/// clean end of stream.
pub struct StubSource {
    lines: VecDeque<Result<String>>,
}

impl StubSource {
    /// Create a stub from raw lines.
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines: lines.into_iter().map(Ok).collect(),
        }
    }

    /// Create a stub from event values, one JSON line each.
    pub fn from_events(events: &[Value]) -> Self {
        Self::new(events.iter().map(|event| event.to_string()).collect())
    }

    /// Create a stub that fails with `error` after replaying `lines`.
    pub fn with_error(lines: Vec<String>, error: Error) -> Self {
        let mut queue: VecDeque<Result<String>> = lines.into_iter().map(Ok).collect();
        queue.push_back(Err(error));
        Self { lines: queue }
    }
}

impl LineSource for StubSource {
    async fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.pop_front() {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }

    async fn shutdown(&mut self) {}
}

/// Builder for realistic event sequences.
pub struct ScenarioBuilder {
    events: Vec<Value>,
    thread_id: String,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            thread_id: "thread-test-123".to_string(),
        }
    }

    /// Set the thread ID used by `thread_started`.
    pub fn thread_id(mut self, id: impl Into<String>) -> Self {
        self.thread_id = id.into();
        self
    }

    pub fn thread_started(mut self) -> Self {
        self.events
            .push(json!({"type": "thread.started", "thread_id": self.thread_id}));
        self
    }

    pub fn turn_started(mut self) -> Self {
        self.events.push(json!({"type": "turn.started"}));
        self
    }

    pub fn agent_message(mut self, id: &str, text: &str) -> Self {
        self.events.push(json!({
            "type": "item.completed",
            "item": {"id": id, "type": "agent_message", "text": text}
        }));
        self
    }

    pub fn command_execution(mut self, id: &str, command: &str, exit_code: i32) -> Self {
        self.events.push(json!({
            "type": "item.completed",
            "item": {
                "id": id,
                "type": "command_execution",
                "command": command,
                "aggregated_output": "",
                "exit_code": exit_code,
                "status": if exit_code == 0 { "completed" } else { "failed" }
            }
        }));
        self
    }

    pub fn turn_completed(mut self, cached: u64, input: u64, output: u64) -> Self {
        self.events.push(json!({
            "type": "turn.completed",
            "usage": {
                "cached_input_tokens": cached,
                "input_tokens": input,
                "output_tokens": output
            }
        }));
        self
    }

    pub fn turn_failed(mut self, message: &str) -> Self {
        self.events
            .push(json!({"type": "turn.failed", "error": {"message": message}}));
        self
    }

    /// Append an arbitrary event value.
    pub fn custom(mut self, event: Value) -> Self {
        self.events.push(event);
        self
    }

    pub fn build(self) -> StubSource {
        StubSource::from_events(&self.events)
    }

    /// A complete successful single-message turn.
    pub fn basic(message: &str) -> StubSource {
        Self::new()
            .thread_started()
            .turn_started()
            .agent_message("item-1", message)
            .turn_completed(1, 2, 3)
            .build()
    }
}

/// Write an executable shell script standing in for the codex binary.
#[cfg(unix)]
pub fn write_stub_script(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("codex-stub");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write stub script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("make stub script executable");
    path
}
