//! # libcodex
//!
//! Async Rust wrapper for the Codex CLI.
//!
//! This library drives `codex exec` as a subprocess and shapes its
//! newline-delimited JSON event protocol into typed streams and results:
//! - Multi-turn conversations ([`Thread`]) with automatic ID threading
//! - Live event streaming or fully aggregated turn results
//! - Cancellation and stdout idle timeouts with guaranteed process cleanup
//! - Structured output via JSON schemas
//!
//! ## Quick Start
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
//!
//! ## Streaming
//!
//! ```ignore
//! use futures::StreamExt;
//! use libcodex::protocol::ThreadEvent;
//!
//! let mut events = thread.run_streamed("Refactor the parser").await?;
//! while let Some(event) = events.next().await {
//!     if let ThreadEvent::ItemCompleted { item } = event? {
//!         println!("{:?}", item);
//!     }
//! }
//! ```
//!
//! ## Resuming a conversation
//!
//! ```ignore
//! let thread = codex.start_thread();
//! thread.run("My name is Alice").await?;
//! let id = thread.id().expect("assigned on first turn");
//!
//! // Later, possibly in another process:
//! let thread = codex.resume_thread(id);
//! let turn = thread.run("What's my name?").await?;
//! ```
//!
//! ## Configuration
//!
//! ```ignore
//! use libcodex::{Codex, CodexOptions, SandboxMode, ThreadOptions};
//!
//! let codex = Codex::with_options(
//!     CodexOptions::new()
//!         .api_key("key-...")
//!         .base_url("https://proxy.internal/v1"),
//! );
//! let thread = codex.start_thread_with(
//!     ThreadOptions::new()
//!         .model("gpt-5.1-codex")
//!         .sandbox_mode(SandboxMode::WorkspaceWrite),
//! );
//! ```

mod client;
pub mod config;
mod error;
pub mod process;
pub mod protocol;
mod schema;
mod stream;
mod thread;

pub use error::{Error, Result};

// Re-export the main client types at crate root
pub use client::Codex;
pub use thread::{Input, Thread, Turn, TurnParams, UserInput};

// Re-export commonly used config types at crate root
pub use config::{
    ApprovalMode, CodexOptions, ReasoningEffort, SandboxMode, ThreadId, ThreadOptions,
    TurnOptions, WebSearchMode,
};

// Re-export commonly used protocol types at crate root
pub use protocol::{ThreadError, ThreadEvent, ThreadItem, Usage};

// Re-export stream and resource types at crate root
pub use schema::OutputSchemaFile;
pub use stream::ThreadEventStream;
