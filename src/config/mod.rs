//! Configuration for the Codex CLI client.
//!
//! This module provides:
//!
//! - [`CodexOptions`] for client-level settings (binary path, environment,
//!   authentication overrides)
//! - [`ThreadOptions`] for per-conversation settings
//! - [`TurnOptions`] for per-exchange settings
//! - Type-safe option enums like [`SandboxMode`] and [`ApprovalMode`],
//!   and the [`ThreadId`] newtype
//!
//! # Example
//!
//! ```ignore
//! use libcodex::config::{CodexOptions, SandboxMode, ThreadOptions};
//!
//! let options = CodexOptions::new().api_key("key-...");
//! let thread_options = ThreadOptions::new()
//!     .model("gpt-5.1-codex")
//!     .sandbox_mode(SandboxMode::ReadOnly);
//! ```

pub mod builder;
pub mod options;

// Re-export commonly used types
pub use builder::{CodexOptions, ThreadOptions, TurnOptions, DEFAULT_IDLE_TIMEOUT};
pub use options::{ApprovalMode, ReasoningEffort, SandboxMode, ThreadId, WebSearchMode};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_exports_accessible() {
        let _: SandboxMode = SandboxMode::ReadOnly;
        let _: ApprovalMode = ApprovalMode::Never;
        let _: ReasoningEffort = ReasoningEffort::Medium;
        let _: WebSearchMode = WebSearchMode::Disabled;
        let _: ThreadId = ThreadId::new("test");
        let _: CodexOptions = CodexOptions::new();
        let _: ThreadOptions = ThreadOptions::new();
        let _: TurnOptions = TurnOptions::new();
    }
}
