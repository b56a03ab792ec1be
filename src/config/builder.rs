//! Client, thread, and turn configuration.
//!
//! Three layers of configuration mirror the lifecycle of a conversation:
//!
//! - [`CodexOptions`]: how to reach the CLI (binary path, environment,
//!   base URL and API key overrides). Fixed for the lifetime of a client.
//! - [`ThreadOptions`]: per-conversation knobs (model, sandbox, working
//!   directory, …). Fixed when a thread is started or resumed.
//! - [`TurnOptions`]: per-exchange knobs (output schema, cancellation
//!   signal, idle timeout).
//!
//! All three are plain option bags with chainable setters; every field is
//! optional and an unset field contributes nothing to the CLI invocation.
//!
//! # Example
//!
//! ```ignore
//! use libcodex::{Codex, SandboxMode, ThreadOptions};
//!
//! let codex = Codex::new();
//! let thread = codex.start_thread_with(
//!     ThreadOptions::default()
//!         .model("gpt-5.1-codex")
//!         .sandbox_mode(SandboxMode::WorkspaceWrite)
//!         .working_directory("/tmp/work"),
//! );
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::options::{ApprovalMode, ReasoningEffort, SandboxMode, WebSearchMode};

/// Idle timeout applied to a turn when the caller does not set one.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Client-level configuration: how to locate and authenticate the CLI.
#[derive(Debug, Clone, Default)]
pub struct CodexOptions {
    /// Explicit path to the codex binary. Defaults to `codex` on `PATH`.
    pub codex_path_override: Option<PathBuf>,
    /// Base URL override, exported as `OPENAI_BASE_URL` to the subprocess.
    pub base_url: Option<String>,
    /// API key override, exported as `CODEX_API_KEY` to the subprocess.
    pub api_key: Option<String>,
    /// Environment override for the subprocess.
    ///
    /// When set, this map *replaces* the ambient process environment; it is
    /// never merged with it. When unset, the subprocess inherits the
    /// ambient environment.
    pub env: Option<HashMap<String, String>>,
}

impl CodexOptions {
    /// Create empty options (inherit environment, find `codex` on `PATH`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit path to the codex binary.
    pub fn codex_path_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.codex_path_override = Some(path.into());
        self
    }

    /// Set the base URL the agent should talk to.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key the agent should authenticate with.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Replace the subprocess environment with the given map.
    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }
}

/// Per-conversation configuration, applied to every turn of a thread.
#[derive(Debug, Clone, Default)]
pub struct ThreadOptions {
    /// Model name passed as `--model`.
    pub model: Option<String>,
    /// Sandbox policy passed as `--sandbox`.
    pub sandbox_mode: Option<SandboxMode>,
    /// Working directory passed as `--cd`.
    pub working_directory: Option<PathBuf>,
    /// Skip the check that the working directory is a git repository.
    pub skip_git_repo_check: bool,
    /// Reasoning effort passed as a `--config` assignment.
    pub model_reasoning_effort: Option<ReasoningEffort>,
    /// Whether sandboxed commands may reach the network.
    pub network_access_enabled: Option<bool>,
    /// Web search mode. Takes precedence over [`web_search_enabled`].
    ///
    /// [`web_search_enabled`]: Self::web_search_enabled
    pub web_search_mode: Option<WebSearchMode>,
    /// Boolean shorthand for web search: `true` means live, `false` disabled.
    pub web_search_enabled: Option<bool>,
    /// Command approval policy.
    pub approval_policy: Option<ApprovalMode>,
    /// Extra directories the agent may touch, one `--add-dir` each.
    pub additional_directories: Vec<PathBuf>,
}

impl ThreadOptions {
    /// Create empty options; every turn runs with the CLI defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sandbox policy.
    pub fn sandbox_mode(mut self, mode: SandboxMode) -> Self {
        self.sandbox_mode = Some(mode);
        self
    }

    /// Set the working directory for the agent.
    pub fn working_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(path.into());
        self
    }

    /// Skip the git-repository check on the working directory.
    pub fn skip_git_repo_check(mut self, skip: bool) -> Self {
        self.skip_git_repo_check = skip;
        self
    }

    /// Set the reasoning effort.
    pub fn model_reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.model_reasoning_effort = Some(effort);
        self
    }

    /// Allow or deny network access from the sandbox.
    pub fn network_access_enabled(mut self, enabled: bool) -> Self {
        self.network_access_enabled = Some(enabled);
        self
    }

    /// Set the web search mode.
    pub fn web_search_mode(mut self, mode: WebSearchMode) -> Self {
        self.web_search_mode = Some(mode);
        self
    }

    /// Enable or disable web search (shorthand for live/disabled).
    pub fn web_search_enabled(mut self, enabled: bool) -> Self {
        self.web_search_enabled = Some(enabled);
        self
    }

    /// Set the command approval policy.
    pub fn approval_policy(mut self, policy: ApprovalMode) -> Self {
        self.approval_policy = Some(policy);
        self
    }

    /// Add a directory the agent may touch beyond the working directory.
    pub fn additional_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.additional_directories.push(path.into());
        self
    }
}

/// Per-turn configuration.
#[derive(Debug, Clone)]
pub struct TurnOptions {
    /// JSON schema the final response must conform to.
    ///
    /// Must be a JSON object; anything else is rejected before the process
    /// is spawned. The schema is materialized as a temporary file for the
    /// CLI and deleted when the turn ends.
    pub output_schema: Option<Value>,
    /// External cancellation signal. When it fires, the in-flight read is
    /// abandoned and the subprocess is torn down.
    pub signal: Option<CancellationToken>,
    /// Maximum gap allowed between stdout chunks before the turn fails.
    ///
    /// This bounds "the agent stopped producing output", not total turn
    /// duration. `None` disables the idle watchdog entirely.
    pub idle_timeout: Option<Duration>,
}

impl Default for TurnOptions {
    fn default() -> Self {
        Self {
            output_schema: None,
            signal: None,
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
        }
    }
}

impl TurnOptions {
    /// Create options with the default idle timeout and nothing else.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output schema.
    pub fn output_schema(mut self, schema: Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Set the cancellation signal.
    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Set the stdout idle timeout, or `None` to disable it.
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codex_options_chain() {
        let options = CodexOptions::new()
            .codex_path_override("/usr/local/bin/codex")
            .base_url("http://example.test")
            .api_key("key-123");

        assert_eq!(
            options.codex_path_override,
            Some(PathBuf::from("/usr/local/bin/codex"))
        );
        assert_eq!(options.base_url.as_deref(), Some("http://example.test"));
        assert_eq!(options.api_key.as_deref(), Some("key-123"));
        assert!(options.env.is_none());
    }

    #[test]
    fn thread_options_chain() {
        let options = ThreadOptions::new()
            .model("gpt-test-1")
            .sandbox_mode(SandboxMode::WorkspaceWrite)
            .working_directory("/tmp/work")
            .skip_git_repo_check(true)
            .model_reasoning_effort(ReasoningEffort::High)
            .network_access_enabled(true)
            .web_search_enabled(false)
            .approval_policy(ApprovalMode::OnRequest)
            .additional_directory("/tmp/a")
            .additional_directory("/tmp/b");

        assert_eq!(options.model.as_deref(), Some("gpt-test-1"));
        assert_eq!(options.sandbox_mode, Some(SandboxMode::WorkspaceWrite));
        assert!(options.skip_git_repo_check);
        assert_eq!(
            options.model_reasoning_effort,
            Some(ReasoningEffort::High)
        );
        assert_eq!(options.network_access_enabled, Some(true));
        assert_eq!(options.web_search_enabled, Some(false));
        assert_eq!(options.approval_policy, Some(ApprovalMode::OnRequest));
        assert_eq!(
            options.additional_directories,
            vec![PathBuf::from("/tmp/a"), PathBuf::from("/tmp/b")]
        );
    }

    #[test]
    fn thread_options_default_is_empty() {
        let options = ThreadOptions::default();
        assert!(options.model.is_none());
        assert!(options.sandbox_mode.is_none());
        assert!(!options.skip_git_repo_check);
        assert!(options.additional_directories.is_empty());
    }

    #[test]
    fn turn_options_default_idle_timeout() {
        let options = TurnOptions::default();
        assert_eq!(options.idle_timeout, Some(DEFAULT_IDLE_TIMEOUT));
        assert!(options.output_schema.is_none());
        assert!(options.signal.is_none());
    }

    #[test]
    fn turn_options_idle_timeout_can_be_disabled() {
        let options = TurnOptions::new().idle_timeout(None);
        assert_eq!(options.idle_timeout, None);
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CodexOptions>();
        assert_send_sync::<ThreadOptions>();
        assert_send_sync::<TurnOptions>();
    }
}
