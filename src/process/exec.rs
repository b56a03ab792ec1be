//! Codex CLI invocation: argument and environment assembly, process
//! spawning, and lifecycle management.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::io::{LineReader, LineSource};
use super::{DEFAULT_EXECUTABLE, STDERR_CHUNK_SIZE};
use crate::config::{ApprovalMode, ReasoningEffort, SandboxMode, ThreadId, WebSearchMode};
use crate::{Error, Result};

/// Environment variable naming the integration that spawned the CLI.
///
/// Set only when the caller's environment does not already define it.
pub const INTERNAL_ORIGINATOR_ENV: &str = "CODEX_INTERNAL_ORIGINATOR_OVERRIDE";

/// Originator marker written into [`INTERNAL_ORIGINATOR_ENV`].
pub const SDK_ORIGINATOR: &str = "codex_sdk_rs";

/// Everything needed for one `codex exec` invocation.
///
/// Built once per turn and never mutated afterwards. Unset optional fields
/// contribute nothing to the argument vector.
#[derive(Debug, Clone, Default)]
pub struct ExecArgs {
    /// The prompt, written in full to the child's stdin.
    pub input_text: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// When set, the invocation resumes this conversation.
    pub thread_id: Option<ThreadId>,
    /// Image paths, one `--image` flag each, in order.
    pub images: Vec<PathBuf>,
    pub model: Option<String>,
    pub sandbox_mode: Option<SandboxMode>,
    pub working_directory: Option<PathBuf>,
    /// Extra directories, one `--add-dir` flag each, in order.
    pub additional_directories: Vec<PathBuf>,
    pub skip_git_repo_check: bool,
    pub output_schema_file: Option<PathBuf>,
    pub reasoning_effort: Option<ReasoningEffort>,
    /// External cancellation signal for the stdout read loop.
    pub signal: Option<CancellationToken>,
    pub network_access_enabled: Option<bool>,
    pub web_search_mode: Option<WebSearchMode>,
    pub web_search_enabled: Option<bool>,
    pub approval_policy: Option<ApprovalMode>,
    /// Maximum gap between stdout chunks.
    pub idle_timeout: Option<Duration>,
}

impl ExecArgs {
    /// Create args for the given prompt with everything else unset.
    pub fn new(input_text: impl Into<String>) -> Self {
        Self {
            input_text: input_text.into(),
            ..Self::default()
        }
    }
}

/// Launches `codex exec` processes.
///
/// One `CodexExec` is shared by every thread of a client; each call to
/// [`run`](Self::run) owns exactly one child process.
#[derive(Debug)]
pub struct CodexExec {
    executable: PathBuf,
    env_override: Option<HashMap<String, String>>,
}

impl CodexExec {
    /// Create an executor.
    ///
    /// Without an explicit path the OS resolves `codex` on `PATH` at spawn
    /// time. When `env_override` is given it replaces the ambient process
    /// environment entirely; otherwise the ambient environment is inherited.
    pub fn new(
        executable_path: Option<PathBuf>,
        env_override: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            executable: executable_path.unwrap_or_else(|| PathBuf::from(DEFAULT_EXECUTABLE)),
            env_override,
        }
    }

    /// Spawn one invocation and return its line stream.
    ///
    /// The whole input is written to the child's stdin, which is then
    /// closed so the child sees end-of-input. Stderr is drained in the
    /// background for failure diagnostics.
    pub async fn run(&self, args: ExecArgs) -> Result<ExecStream> {
        let command_args = self.build_args(&args);
        let env = self.build_env(&args);

        let mut cmd = Command::new(&self.executable);
        cmd.args(&command_args)
            .env_clear()
            .envs(&env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(executable = %self.executable.display(), args = ?command_args, "spawning codex exec");

        let mut child = cmd.spawn().map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                Error::ExecutableNotFound {
                    searched: self.executable.display().to_string(),
                }
            } else {
                Error::ProcessSpawn(err)
            }
        })?;

        // Write the prompt and close stdin; the child waits for end-of-input
        // before producing output.
        let mut stdin = child.stdin.take().expect("stdin was configured");
        stdin
            .write_all(args.input_text.as_bytes())
            .await
            .map_err(Error::io)?;
        stdin.shutdown().await.map_err(Error::io)?;
        drop(stdin);

        let stderr = child.stderr.take().expect("stderr was configured");
        let stdout = child.stdout.take().expect("stdout was configured");

        Ok(ExecStream {
            child,
            reader: LineReader::new(stdout),
            stderr_task: Some(drain_stderr(stderr)),
            signal: args.signal,
            idle_timeout: args.idle_timeout,
            finished: false,
        })
    }

    /// Build the argument vector for one invocation.
    ///
    /// The order is deterministic: subcommand and output format first, one
    /// flag per populated optional field, list fields in input order, and
    /// the `resume` subcommand last.
    pub(crate) fn build_args(&self, args: &ExecArgs) -> Vec<String> {
        let mut out = vec!["exec".to_string(), "--experimental-json".to_string()];

        if let Some(ref model) = args.model {
            out.push("--model".to_string());
            out.push(model.clone());
        }
        if let Some(mode) = args.sandbox_mode {
            out.push("--sandbox".to_string());
            out.push(mode.to_string());
        }
        if let Some(ref dir) = args.working_directory {
            out.push("--cd".to_string());
            out.push(dir.display().to_string());
        }
        for dir in &args.additional_directories {
            out.push("--add-dir".to_string());
            out.push(dir.display().to_string());
        }
        if args.skip_git_repo_check {
            out.push("--skip-git-repo-check".to_string());
        }
        if let Some(ref path) = args.output_schema_file {
            out.push("--output-schema".to_string());
            out.push(path.display().to_string());
        }
        if let Some(effort) = args.reasoning_effort {
            out.push("--config".to_string());
            out.push(format!("model_reasoning_effort=\"{effort}\""));
        }
        if let Some(enabled) = args.network_access_enabled {
            out.push("--config".to_string());
            out.push(format!("sandbox_workspace_write.network_access={enabled}"));
        }
        if let Some(mode) = args.web_search_mode {
            out.push("--config".to_string());
            out.push(format!("web_search=\"{mode}\""));
        } else if args.web_search_enabled == Some(true) {
            out.push("--config".to_string());
            out.push("web_search=\"live\"".to_string());
        } else if args.web_search_enabled == Some(false) {
            out.push("--config".to_string());
            out.push("web_search=\"disabled\"".to_string());
        }
        if let Some(policy) = args.approval_policy {
            out.push("--config".to_string());
            out.push(format!("approval_policy=\"{policy}\""));
        }
        for image in &args.images {
            out.push("--image".to_string());
            out.push(image.display().to_string());
        }
        if let Some(ref thread_id) = args.thread_id {
            out.push("resume".to_string());
            out.push(thread_id.to_string());
        }

        out
    }

    /// Build the child's environment for one invocation.
    ///
    /// The override map, when present, replaces the ambient environment;
    /// it is never merged with it. The originator marker is set only if
    /// absent, and the request's base-URL/API-key overrides are injected
    /// last.
    pub(crate) fn build_env(&self, args: &ExecArgs) -> HashMap<String, String> {
        let mut env: HashMap<String, String> = match self.env_override {
            Some(ref overridden) => overridden.clone(),
            None => std::env::vars().collect(),
        };

        env.entry(INTERNAL_ORIGINATOR_ENV.to_string())
            .or_insert_with(|| SDK_ORIGINATOR.to_string());
        if let Some(ref base_url) = args.base_url {
            env.insert("OPENAI_BASE_URL".to_string(), base_url.clone());
        }
        if let Some(ref api_key) = args.api_key {
            env.insert("CODEX_API_KEY".to_string(), api_key.clone());
        }
        env
    }
}

/// The line stream of one running `codex exec` invocation.
///
/// Owns the child process, its stdout reader, and the background stderr
/// drain. On clean end of stream it waits for the process and classifies
/// the exit status; on any failure it kills the process and waits so no
/// zombie or leaked descriptor remains. Dropping the stream mid-flight
/// starts a kill (`kill_on_drop` reaps the child).
#[derive(Debug)]
pub struct ExecStream {
    child: Child,
    reader: LineReader<ChildStdout>,
    stderr_task: Option<JoinHandle<Vec<u8>>>,
    signal: Option<CancellationToken>,
    idle_timeout: Option<Duration>,
    finished: bool,
}

impl ExecStream {
    /// Wait for process exit and classify it. Clean-EOF path only.
    async fn finish(&mut self) -> Result<()> {
        let status = match self.child.wait().await {
            Ok(status) => status,
            Err(err) => {
                self.teardown().await;
                return Err(Error::io(err));
            }
        };
        let stderr = match self.stderr_task.take() {
            Some(task) => task.await.unwrap_or_default(),
            None => Vec::new(),
        };
        if status.success() {
            return Ok(());
        }
        Err(Error::ProcessExited {
            detail: exit_detail(&status),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }

    /// Cancel the stderr drain, await its quiescence, and kill the process
    /// if it has not exited. Idempotent; runs on every early-exit path.
    async fn teardown(&mut self) {
        if let Some(task) = self.stderr_task.take() {
            task.abort();
            let _ = task.await;
        }
        if self.child.id().is_some() {
            if let Err(err) = self.child.kill().await {
                tracing::warn!("failed to kill codex process: {err}");
            }
        }
    }
}

impl LineSource for ExecStream {
    async fn next_line(&mut self) -> Result<Option<String>> {
        if self.finished {
            return Ok(None);
        }
        match self
            .reader
            .next_line(self.signal.as_ref(), self.idle_timeout)
            .await
        {
            Ok(Some(line)) => Ok(Some(line)),
            Ok(None) => {
                self.finished = true;
                self.finish().await?;
                Ok(None)
            }
            Err(err) => {
                self.finished = true;
                self.teardown().await;
                Err(err)
            }
        }
    }

    async fn shutdown(&mut self) {
        self.finished = true;
        self.teardown().await;
    }
}

impl Drop for ExecStream {
    fn drop(&mut self) {
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }
        // kill_on_drop reaps the child after the kill is delivered.
        let _ = self.child.start_kill();
    }
}

/// Drain a stderr pipe to completion in the background.
///
/// The pipe must never be left unread: a full kernel buffer would stall
/// the child. All bytes are kept for failure diagnostics.
fn drain_stderr(mut stderr: ChildStderr) -> JoinHandle<Vec<u8>> {
    tokio::spawn(async move {
        let mut collected = Vec::new();
        let mut chunk = vec![0u8; STDERR_CHUNK_SIZE];
        loop {
            match stderr.read(&mut chunk).await {
                Ok(0) => break,
                Ok(read) => collected.extend_from_slice(&chunk[..read]),
                Err(err) => {
                    tracing::debug!("codex stderr read failed: {err}");
                    break;
                }
            }
        }
        collected
    })
}

#[cfg(unix)]
fn exit_detail(status: &std::process::ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;
    match (status.code(), status.signal()) {
        (Some(code), _) => format!("code {code}"),
        (None, Some(signal)) => format!("signal {signal}"),
        (None, None) => "unknown exit status".to_string(),
    }
}

#[cfg(not(unix))]
fn exit_detail(status: &std::process::ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("code {code}"),
        None => "unknown exit status".to_string(),
    }
}
