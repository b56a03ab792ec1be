//! Type-safe configuration options for the Codex CLI.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sandbox policy applied to the agent's command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SandboxMode {
    /// No writes anywhere; commands run read-only.
    ReadOnly,
    /// Writes allowed inside the workspace only.
    WorkspaceWrite,
    /// No sandboxing at all (use with caution).
    DangerFullAccess,
}

impl fmt::Display for SandboxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SandboxMode::ReadOnly => write!(f, "read-only"),
            SandboxMode::WorkspaceWrite => write!(f, "workspace-write"),
            SandboxMode::DangerFullAccess => write!(f, "danger-full-access"),
        }
    }
}

/// When the agent asks the user to approve a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalMode {
    /// Never ask; commands run unattended.
    Never,
    /// Ask only when the agent requests escalation.
    OnRequest,
    /// Ask after a sandboxed command fails.
    OnFailure,
    /// Ask for anything not on the trusted list.
    Untrusted,
}

impl fmt::Display for ApprovalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalMode::Never => write!(f, "never"),
            ApprovalMode::OnRequest => write!(f, "on-request"),
            ApprovalMode::OnFailure => write!(f, "on-failure"),
            ApprovalMode::Untrusted => write!(f, "untrusted"),
        }
    }
}

/// Reasoning effort requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Minimal,
    Low,
    Medium,
    High,
    XHigh,
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasoningEffort::Minimal => write!(f, "minimal"),
            ReasoningEffort::Low => write!(f, "low"),
            ReasoningEffort::Medium => write!(f, "medium"),
            ReasoningEffort::High => write!(f, "high"),
            ReasoningEffort::XHigh => write!(f, "xhigh"),
        }
    }
}

/// How the agent may use web search during a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebSearchMode {
    /// No web search.
    Disabled,
    /// Cached results only.
    Cached,
    /// Live searches allowed.
    Live,
}

impl fmt::Display for WebSearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebSearchMode::Disabled => write!(f, "disabled"),
            WebSearchMode::Cached => write!(f, "cached"),
            WebSearchMode::Live => write!(f, "live"),
        }
    }
}

/// Newtype for thread IDs to prevent string mixups.
///
/// A thread ID is assigned by the agent on the first `thread.started` event
/// of a conversation and is used to resume that conversation later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub String);

impl ThreadId {
    /// Create a new ThreadId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        ThreadId(id.into())
    }

    /// Get the thread ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        ThreadId(s)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        ThreadId(s.to_string())
    }
}

impl AsRef<str> for ThreadId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
