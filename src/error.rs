use std::time::Duration;

/// Errors that can occur when using libcodex.
///
/// Errors are organized by category:
/// - Configuration errors: detected before any process is spawned
/// - Spawn errors: failed to start the Codex CLI process
/// - IO errors: communication failures with the subprocess
/// - Protocol errors: malformed CLI output
/// - Runtime errors: failures during a turn
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // -------------------------------------------------------------------------
    // Configuration errors (detected before spawn)
    // -------------------------------------------------------------------------
    /// Conflicting turn parameters were supplied.
    ///
    /// A turn takes either a whole [`TurnOptions`](crate::TurnOptions) value
    /// or discrete fields, never both.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// The caller supplied an output schema that is not a JSON object.
    #[error("invalid output schema: {0}")]
    InvalidSchema(String),

    // -------------------------------------------------------------------------
    // Spawn errors
    // -------------------------------------------------------------------------
    /// Codex CLI binary not found.
    #[error("codex executable not found (searched: {searched})")]
    ExecutableNotFound { searched: String },

    /// Failed to spawn the codex subprocess.
    #[error("failed to spawn codex process: {0}")]
    ProcessSpawn(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // IO errors
    // -------------------------------------------------------------------------
    /// IO error communicating with the codex subprocess.
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol errors
    // -------------------------------------------------------------------------
    /// A stdout line could not be parsed as a JSON event.
    ///
    /// Carries the offending line verbatim for diagnosis. This is fatal to
    /// the in-flight turn.
    #[error("failed to parse event: {line}")]
    MalformedEvent {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    // -------------------------------------------------------------------------
    // Runtime errors
    // -------------------------------------------------------------------------
    /// No stdout chunk arrived within the configured idle window.
    #[error("codex stdout idle for {0:?}")]
    IdleTimeout(Duration),

    /// The turn was cancelled through its cancellation signal.
    #[error("turn cancelled")]
    Cancelled,

    /// The codex process exited unsuccessfully.
    ///
    /// `detail` is `code N` or `signal N`; `stderr` is everything the
    /// process wrote to its error stream.
    #[error("codex exec exited with {detail}: {stderr}")]
    ProcessExited { detail: String, stderr: String },

    /// The agent itself reported the turn as failed via a `turn.failed` event.
    #[error("{message}")]
    TurnFailed { message: String },

    /// The event stream ended without a `turn.completed` or `turn.failed`
    /// event. The turn result would be ill-formed, so this is an error
    /// rather than a partial success.
    #[error("codex stream ended before the turn completed or failed")]
    IncompleteTurn,
}

/// A specialized Result type for libcodex operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a malformed-event error carrying the offending line.
    pub fn malformed_event(source: serde_json::Error, line: &str) -> Self {
        Self::MalformedEvent {
            line: line.to_string(),
            source,
        }
    }

    /// Create an IO error.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io(source)
    }

    /// Check if this error is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Check if this error is an idle timeout.
    pub fn is_idle_timeout(&self) -> bool {
        matches!(self, Error::IdleTimeout(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }

    #[test]
    fn turn_failed_displays_bare_message() {
        // The surfaced message must equal what the agent reported.
        let err = Error::TurnFailed {
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn idle_timeout_carries_duration() {
        let err = Error::IdleTimeout(Duration::from_secs(60));
        assert!(err.is_idle_timeout());
        assert!(err.to_string().contains("60s"));
    }

    #[test]
    fn malformed_event_names_the_line() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = Error::malformed_event(source, "not json");
        assert!(err.to_string().contains("not json"));
    }

    #[test]
    fn cancelled_detection() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::IncompleteTurn.is_cancelled());
        assert!(!Error::IdleTimeout(Duration::from_secs(1)).is_cancelled());
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn question_mark_operator_io() {
        fn fallible_io() -> Result<()> {
            let _file = std::fs::File::open("/nonexistent/path/that/does/not/exist")?;
            Ok(())
        }
        let result = fallible_io();
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn process_exited_includes_stderr() {
        let err = Error::ProcessExited {
            detail: "code 3".into(),
            stderr: "fatal: bad flag".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("code 3"));
        assert!(rendered.contains("fatal: bad flag"));
    }
}
