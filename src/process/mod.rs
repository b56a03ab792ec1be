//! Process management for the Codex CLI.
//!
//! This module owns one `codex exec` invocation per turn: assembling its
//! arguments and environment, spawning it with three piped endpoints, and
//! turning its stdout into a sequence of text lines.
//!
//! # Architecture
//!
//! ```text
//! libcodex                           codex CLI
//! ┌─────────────┐                   ┌─────────────┐
//! │  CodexExec  │───stdin (prompt)─▶│             │
//! │  ExecStream │◀──stdout (JSONL)──│  exec       │
//! │             │◀──stderr (logs)───│             │
//! └─────────────┘                   └─────────────┘
//! ```
//!
//! The prompt is written in full to stdin, which is then closed; the child
//! produces newline-delimited JSON events on stdout. Stderr is drained
//! concurrently and reported when the process exits unsuccessfully.
//!
//! Whatever way a turn ends — success, failure, cancellation, idle timeout,
//! or the consumer walking away — the invocation's stderr drain is stopped
//! and the process is killed and reaped if still running.

mod exec;
mod io;

pub use exec::{CodexExec, ExecArgs, ExecStream, INTERNAL_ORIGINATOR_ENV, SDK_ORIGINATOR};
pub use io::{LineReader, LineSource};

/// Executable looked up on `PATH` when no override is configured.
pub const DEFAULT_EXECUTABLE: &str = "codex";

/// Stdout is read in chunks of this size; bounds memory for large outputs.
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Stderr drain chunk size.
pub(crate) const STDERR_CHUNK_SIZE: usize = 8 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_reasonable() {
        assert!(READ_CHUNK_SIZE >= 4 * 1024);
        assert!(STDERR_CHUNK_SIZE >= 1024);
        assert_eq!(DEFAULT_EXECUTABLE, "codex");
    }

    #[test]
    fn originator_constants_stable() {
        // These are part of the environment contract with the CLI.
        assert_eq!(INTERNAL_ORIGINATOR_ENV, "CODEX_INTERNAL_ORIGINATOR_OVERRIDE");
        assert_eq!(SDK_ORIGINATOR, "codex_sdk_rs");
    }
}
