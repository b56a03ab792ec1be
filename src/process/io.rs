//! I/O primitives for reading the Codex CLI event stream.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

use super::READ_CHUNK_SIZE;
use crate::{Error, Result};

/// A pull-based source of decoded text lines.
///
/// `Ok(None)` means the sequence ended cleanly; after that, implementations
/// keep returning `Ok(None)`. The sequence is finite and not restartable.
pub trait LineSource {
    /// Pull the next line, with separators stripped.
    fn next_line(&mut self) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Tear down the underlying transport.
    ///
    /// Called once when the consumer stops pulling, on every exit path.
    /// Must be idempotent.
    fn shutdown(&mut self) -> impl Future<Output = ()> + Send;
}

/// Reads newline-delimited text from a byte stream in bounded chunks.
///
/// Lines are reassembled across chunk boundaries; a non-empty trailing
/// partial line is flushed as a final line at end of stream. Invalid UTF-8
/// is decoded with replacement characters rather than failing the read.
///
/// Each chunk read can be raced against a [`CancellationToken`] and an idle
/// timeout; see [`next_line`](Self::next_line).
#[derive(Debug)]
pub struct LineReader<R> {
    source: R,
    /// Reusable chunk buffer for the current read.
    chunk: Box<[u8]>,
    /// Bytes of a partial line carried across reads.
    buffer: Vec<u8>,
    /// Complete lines ready to be handed out.
    lines: VecDeque<String>,
    done: bool,
}

impl<R> LineReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    /// Create a new reader over a byte stream.
    pub fn new(source: R) -> Self {
        Self {
            source,
            chunk: vec![0u8; READ_CHUNK_SIZE].into_boxed_slice(),
            buffer: Vec::new(),
            lines: VecDeque::new(),
            done: false,
        }
    }

    /// Read the next line.
    ///
    /// Returns `Ok(Some(line))` per line, `Ok(None)` once the stream ends.
    ///
    /// If `cancel` fires while a chunk read is in flight, the read is
    /// abandoned and the call fails with [`Error::Cancelled`]. If
    /// `idle_timeout` is set and no chunk arrives within it (measured from
    /// when the read started), the call fails with [`Error::IdleTimeout`].
    /// When both are set they race; cancellation wins ties.
    ///
    /// A read error other than cancellation or timeout ends the sequence:
    /// already-buffered data is still yielded before `Ok(None)`.
    pub async fn next_line(
        &mut self,
        cancel: Option<&CancellationToken>,
        idle_timeout: Option<Duration>,
    ) -> Result<Option<String>> {
        loop {
            if let Some(line) = self.lines.pop_front() {
                return Ok(Some(line));
            }
            if self.done {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let tail = std::mem::take(&mut self.buffer);
                return Ok(Some(decode_line(&tail)));
            }

            tracing::debug!(buffered = self.buffer.len(), "waiting for stdout chunk");
            let Self { source, chunk, .. } = self;
            match read_chunk(source, chunk, cancel, idle_timeout).await {
                Ok(0) => {
                    self.done = true;
                }
                Ok(read) => {
                    tracing::debug!(bytes = read, "received stdout chunk");
                    self.buffer.extend_from_slice(&chunk[..read]);
                    self.split_buffered_lines();
                }
                Err(err @ (Error::Cancelled | Error::IdleTimeout(_))) => return Err(err),
                Err(err) => {
                    tracing::warn!("error reading codex stdout: {err}");
                    self.done = true;
                }
            }
        }
    }

    /// Move every complete line out of the byte buffer.
    fn split_buffered_lines(&mut self) {
        while let Some(pos) = self.buffer.iter().position(|&byte| byte == b'\n') {
            let rest = self.buffer.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.buffer, rest);
            line.pop();
            self.lines.push_back(decode_line(&line));
        }
    }
}

/// Read one chunk, racing the supplied cancellation signal and idle window.
async fn read_chunk<R>(
    source: &mut R,
    chunk: &mut [u8],
    cancel: Option<&CancellationToken>,
    idle_timeout: Option<Duration>,
) -> Result<usize>
where
    R: AsyncRead + Unpin,
{
    match (cancel, idle_timeout) {
        (None, None) => source.read(chunk).await.map_err(Error::io),
        (None, Some(limit)) => match tokio::time::timeout(limit, source.read(chunk)).await {
            Ok(read) => read.map_err(Error::io),
            Err(_) => Err(Error::IdleTimeout(limit)),
        },
        (Some(signal), None) => {
            tokio::select! {
                biased;
                () = signal.cancelled() => Err(Error::Cancelled),
                read = source.read(chunk) => read.map_err(Error::io),
            }
        }
        (Some(signal), Some(limit)) => {
            tokio::select! {
                biased;
                () = signal.cancelled() => Err(Error::Cancelled),
                read = tokio::time::timeout(limit, source.read(chunk)) => match read {
                    Ok(read) => read.map_err(Error::io),
                    Err(_) => Err(Error::IdleTimeout(limit)),
                },
            }
        }
    }
}

/// Decode one line lossily, stripping any trailing carriage returns.
fn decode_line(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.trim_end_matches('\r').to_string()
}
