//! Threads: multi-turn conversations with the Codex agent.
//!
//! A [`Thread`] owns the conversation identity and runs turns against it.
//! Each turn spawns one `codex exec` process; conversation history lives
//! with the agent and is rejoined by passing the thread ID to `resume`.
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
//!
//!     let turn = thread.run("Summarize the failing tests").await?;
//!     println!("{}", turn.final_response);
//!
//!     // The same thread remembers context across turns.
//!     let turn = thread.run("Now fix the first one").await?;
//!     println!("{}", turn.final_response);
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::{CodexOptions, ThreadId, ThreadOptions, TurnOptions};
use crate::process::{CodexExec, ExecArgs};
use crate::protocol::{ThreadItem, Usage};
use crate::schema::OutputSchemaFile;
use crate::stream::ThreadEventStream;
use crate::{Error, Result};

/// The materialized result of one turn.
#[derive(Debug, Clone, Default)]
pub struct Turn {
    /// Every completed item, in arrival order.
    pub items: Vec<ThreadItem>,
    /// Text of the last agent message, or empty if there was none.
    pub final_response: String,
    /// Token usage reported by `turn.completed`.
    pub usage: Option<Usage>,
}

/// Input to a turn: a plain prompt or an ordered list of typed parts.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// A single text prompt.
    Text(String),
    /// Mixed text and image parts.
    Items(Vec<UserInput>),
}

/// One part of a structured input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserInput {
    /// A text fragment of the prompt.
    Text { text: String },
    /// A reference to an image on the local filesystem.
    LocalImage { path: PathBuf },
}

impl Input {
    /// Flatten into a prompt string and the image paths.
    ///
    /// Text parts are joined with a blank line, preserving their order;
    /// image paths keep their relative order independently of where they
    /// were interleaved.
    pub(crate) fn normalize(self) -> (String, Vec<PathBuf>) {
        match self {
            Input::Text(text) => (text, Vec::new()),
            Input::Items(items) => {
                let mut parts = Vec::new();
                let mut images = Vec::new();
                for item in items {
                    match item {
                        UserInput::Text { text } => parts.push(text),
                        UserInput::LocalImage { path } => images.push(path),
                    }
                }
                (parts.join("\n\n"), images)
            }
        }
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Input::Text(text.to_string())
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Input::Text(text)
    }
}

impl From<Vec<UserInput>> for Input {
    fn from(items: Vec<UserInput>) -> Self {
        Input::Items(items)
    }
}

/// Parameters for one turn.
///
/// A turn accepts either a whole [`TurnOptions`] value or discrete fields
/// — never both. The ambiguous combination is rejected with
/// [`Error::InvalidOptions`] instead of silently preferring one side.
///
/// # Example
///
/// ```ignore
/// use libcodex::TurnParams;
/// use serde_json::json;
///
/// let params = TurnParams::new()
///     .output_schema(json!({"type": "object"}));
/// let turn = thread.run_with("Answer as JSON", params).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct TurnParams {
    options: Option<TurnOptions>,
    output_schema: Option<Value>,
    signal: Option<CancellationToken>,
}

impl TurnParams {
    /// Start with nothing set; defaults apply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a whole options value. Excludes the discrete setters.
    pub fn options(mut self, options: TurnOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Set just the output schema. Excludes [`options`](Self::options).
    pub fn output_schema(mut self, schema: Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Set just the cancellation signal. Excludes [`options`](Self::options).
    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    pub(crate) fn resolve(self) -> Result<TurnOptions> {
        match self.options {
            Some(options) => {
                if self.output_schema.is_some() || self.signal.is_some() {
                    return Err(Error::InvalidOptions(
                        "pass either turn options or discrete fields, not both".into(),
                    ));
                }
                Ok(options)
            }
            None => Ok(TurnOptions {
                output_schema: self.output_schema,
                signal: self.signal,
                ..TurnOptions::default()
            }),
        }
    }
}

impl From<TurnOptions> for TurnParams {
    fn from(options: TurnOptions) -> Self {
        TurnParams::new().options(options)
    }
}

/// The conversation's identity, shared between the thread and the reader
/// task of an in-flight turn. Set at most once, from the first
/// `thread.started` event seen.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedThreadId(Arc<Mutex<Option<ThreadId>>>);

impl SharedThreadId {
    pub(crate) fn new(id: Option<ThreadId>) -> Self {
        Self(Arc::new(Mutex::new(id)))
    }

    pub(crate) fn get(&self) -> Option<ThreadId> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn capture(&self, id: &str) {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_none() {
            *guard = Some(ThreadId::new(id));
        }
    }
}

/// A multi-turn conversation with the Codex agent.
///
/// Created by [`Codex::start_thread`](crate::Codex::start_thread) or
/// [`Codex::resume_thread`](crate::Codex::resume_thread).
///
/// # Concurrency
///
/// Turns against different threads run independently, each with its own
/// subprocess. A single conversation is logically sequential; running two
/// turns of the same thread concurrently is not prevented here, but the
/// agent's answers will interleave unpredictably.
#[derive(Debug)]
pub struct Thread {
    exec: Arc<CodexExec>,
    options: Arc<CodexOptions>,
    thread_options: ThreadOptions,
    id: SharedThreadId,
}

impl Thread {
    pub(crate) fn new(
        exec: Arc<CodexExec>,
        options: Arc<CodexOptions>,
        thread_options: ThreadOptions,
        id: Option<ThreadId>,
    ) -> Self {
        Self {
            exec,
            options,
            thread_options,
            id: SharedThreadId::new(id),
        }
    }

    /// The conversation ID, once the agent has assigned one.
    ///
    /// `None` until the first turn's `thread.started` event arrives.
    pub fn id(&self) -> Option<ThreadId> {
        self.id.get()
    }

    /// Run one turn to completion and return its materialized result.
    pub async fn run(&self, input: impl Into<Input>) -> Result<Turn> {
        self.run_with(input, TurnParams::new()).await
    }

    /// Run one turn to completion with explicit parameters.
    ///
    /// Fails with the agent's message if it reports `turn.failed`, and
    /// with [`Error::IncompleteTurn`] if the stream ends without a
    /// terminal event.
    pub async fn run_with(&self, input: impl Into<Input>, params: TurnParams) -> Result<Turn> {
        let stream = self.start_turn(input.into(), params.resolve()?).await?;
        stream.collect_turn().await
    }

    /// Run one turn, returning its live event stream.
    pub async fn run_streamed(&self, input: impl Into<Input>) -> Result<ThreadEventStream> {
        self.run_streamed_with(input, TurnParams::new()).await
    }

    /// Run one turn with explicit parameters, returning its event stream.
    pub async fn run_streamed_with(
        &self,
        input: impl Into<Input>,
        params: TurnParams,
    ) -> Result<ThreadEventStream> {
        self.start_turn(input.into(), params.resolve()?).await
    }

    async fn start_turn(
        &self,
        input: Input,
        turn_options: TurnOptions,
    ) -> Result<ThreadEventStream> {
        // Validate and materialize the schema before any process exists.
        let schema_file = OutputSchemaFile::create(turn_options.output_schema.as_ref()).await?;
        let (prompt, images) = input.normalize();

        let args = ExecArgs {
            input_text: prompt,
            base_url: self.options.base_url.clone(),
            api_key: self.options.api_key.clone(),
            thread_id: self.id.get(),
            images,
            model: self.thread_options.model.clone(),
            sandbox_mode: self.thread_options.sandbox_mode,
            working_directory: self.thread_options.working_directory.clone(),
            additional_directories: self.thread_options.additional_directories.clone(),
            skip_git_repo_check: self.thread_options.skip_git_repo_check,
            output_schema_file: schema_file.path().map(Path::to_path_buf),
            reasoning_effort: self.thread_options.model_reasoning_effort,
            signal: turn_options.signal,
            network_access_enabled: self.thread_options.network_access_enabled,
            web_search_mode: self.thread_options.web_search_mode,
            web_search_enabled: self.thread_options.web_search_enabled,
            approval_policy: self.thread_options.approval_policy,
            idle_timeout: turn_options.idle_timeout,
        };

        let source = self.exec.run(args).await?;
        Ok(ThreadEventStream::spawn(
            source,
            self.id.clone(),
            Some(schema_file),
        ))
    }
}
