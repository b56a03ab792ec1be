//! High-level Codex client for starting and resuming conversations.
//!
//! This module provides [`Codex`], the main entry point of the library.
//!
//! # Example
//!
//! ```ignore
//! use libcodex::{Codex, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let codex = Codex::new();
//!     let thread = codex.start_thread();
//!     let turn = thread.run("What is 2+2?").await?;
//!     println!("{}", turn.final_response);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use crate::config::{CodexOptions, ThreadId, ThreadOptions};
use crate::process::CodexExec;
use crate::thread::Thread;

/// The entry point for interacting with the Codex agent.
///
/// A `Codex` holds client-level configuration and hands out [`Thread`]s.
/// It is cheap to clone; clones share the same executor and options.
///
/// # Thread Safety
///
/// `Codex` is `Send + Sync`. Every turn spawns its own CLI process, so
/// threads created from the same client can run turns concurrently.
///
/// # Example
///
/// ```ignore
/// use libcodex::{Codex, CodexOptions, ThreadOptions, SandboxMode};
///
/// let codex = Codex::with_options(
///     CodexOptions::new().api_key("key-..."),
/// );
///
/// let thread = codex.start_thread_with(
///     ThreadOptions::new().sandbox_mode(SandboxMode::WorkspaceWrite),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Codex {
    exec: Arc<CodexExec>,
    options: Arc<CodexOptions>,
}

impl Codex {
    /// Create a client with default options.
    ///
    /// The `codex` binary is resolved on `PATH` at spawn time and the
    /// subprocess inherits the ambient environment.
    pub fn new() -> Self {
        Self::with_options(CodexOptions::default())
    }

    /// Create a client with the given options.
    pub fn with_options(options: CodexOptions) -> Self {
        let exec = CodexExec::new(options.codex_path_override.clone(), options.env.clone());
        Self {
            exec: Arc::new(exec),
            options: Arc::new(options),
        }
    }

    /// Start a new conversation with default thread options.
    ///
    /// The thread has no ID until the agent assigns one on its first turn.
    pub fn start_thread(&self) -> Thread {
        self.start_thread_with(ThreadOptions::default())
    }

    /// Start a new conversation with the given thread options.
    pub fn start_thread_with(&self, options: ThreadOptions) -> Thread {
        Thread::new(
            Arc::clone(&self.exec),
            Arc::clone(&self.options),
            options,
            None,
        )
    }

    /// Resume an existing conversation by its ID.
    ///
    /// Every turn of the returned thread is invoked with a trailing
    /// `resume <id>`, so the agent rejoins its stored history.
    pub fn resume_thread(&self, id: impl Into<ThreadId>) -> Thread {
        self.resume_thread_with(id, ThreadOptions::default())
    }

    /// Resume an existing conversation with the given thread options.
    pub fn resume_thread_with(&self, id: impl Into<ThreadId>, options: ThreadOptions) -> Thread {
        Thread::new(
            Arc::clone(&self.exec),
            Arc::clone(&self.options),
            options,
            Some(id.into()),
        )
    }

    /// Get a reference to the client's options.
    pub fn options(&self) -> &CodexOptions {
        &self.options
    }
}

impl Default for Codex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Codex>();
    }

    #[test]
    fn client_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Codex>();
    }

    #[test]
    fn started_thread_has_no_id() {
        let codex = Codex::new();
        let thread = codex.start_thread();
        assert!(thread.id().is_none());
    }

    #[test]
    fn resumed_thread_carries_id() {
        let codex = Codex::new();
        let thread = codex.resume_thread("thread-123");
        assert_eq!(thread.id(), Some(ThreadId::new("thread-123")));
    }

    #[test]
    fn options_accessor() {
        let codex = Codex::with_options(CodexOptions::new().base_url("http://example.test"));
        assert_eq!(
            codex.options().base_url.as_deref(),
            Some("http://example.test")
        );
    }

    #[test]
    fn clones_share_options() {
        let codex = Codex::with_options(CodexOptions::new().api_key("key-1"));
        let clone = codex.clone();
        assert_eq!(
            codex.options().api_key.as_deref(),
            clone.options().api_key.as_deref()
        );
    }
}
