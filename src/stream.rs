//! The live event stream of one turn.
//!
//! [`ThreadEventStream`] implements [`futures::Stream`], yielding each
//! [`ThreadEvent`] in the order the agent emitted it. A background task
//! drives the underlying line source, decodes lines, and captures the
//! conversation's thread ID as a side effect; the consumer only polls.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::process::LineSource;
use crate::protocol::ThreadEvent;
use crate::schema::OutputSchemaFile;
use crate::thread::SharedThreadId;
use crate::{Error, Result};

/// Bound on undelivered events between the reader task and the consumer.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A stream of events from one turn.
///
/// # Termination
///
/// The stream ends after the line sequence ends. A decode failure, idle
/// timeout, cancellation, or process failure is yielded as the final `Err`
/// item. Events after a `turn.failed` are not guaranteed to be delivered.
///
/// # Cancellation
///
/// Dropping the stream stops the reader task and tears down the subprocess
/// and the turn's schema file.
///
/// # Example
///
/// ```ignore
/// use futures::StreamExt;
///
/// let mut events = thread.run_streamed("Fix the failing test").await?;
/// while let Some(event) = events.next().await {
///     println!("{:?}", event?);
/// }
/// ```
pub struct ThreadEventStream {
    rx: mpsc::Receiver<Result<ThreadEvent>>,
    thread_id: SharedThreadId,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl ThreadEventStream {
    /// Spawn the reader task over a line source.
    ///
    /// `thread_id` is updated from the first `thread.started` event seen;
    /// `schema_file` is released when the task ends, however it ends.
    pub(crate) fn spawn<S>(
        source: S,
        thread_id: SharedThreadId,
        schema_file: Option<OutputSchemaFile>,
    ) -> Self
    where
        S: LineSource + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let captured_id = thread_id.clone();

        let task = tokio::spawn(async move {
            // Owned by the task so every exit path, including abort,
            // releases the backing file.
            let _schema_file = schema_file;
            let mut source = source;
            read_loop(&mut source, &tx, &captured_id).await;
            source.shutdown().await;
        });

        Self {
            rx,
            thread_id,
            task: Some(task),
        }
    }

    /// Wrap an arbitrary line source, e.g. a recorded transcript.
    ///
    /// The stream gets its own fresh thread-ID cell, observable through
    /// [`thread_id`](Self::thread_id).
    pub fn from_source<S>(source: S) -> Self
    where
        S: LineSource + Send + 'static,
    {
        Self::spawn(source, SharedThreadId::default(), None)
    }

    /// The conversation ID, once a `thread.started` event has been seen.
    pub fn thread_id(&self) -> Option<crate::ThreadId> {
        self.thread_id.get()
    }

    /// Fold the remaining events into a materialized [`Turn`].
    ///
    /// - `item.completed` appends its item, in arrival order; an agent
    ///   message also becomes the running final response (last one wins).
    /// - `turn.completed` records the usage snapshot.
    /// - `turn.failed` fails immediately with the agent's message; the
    ///   rest of the stream is abandoned, not drained.
    /// - A stream that ends with neither terminal event fails with
    ///   [`Error::IncompleteTurn`].
    ///
    /// [`Turn`]: crate::Turn
    pub async fn collect_turn(mut self) -> Result<crate::Turn> {
        use futures::StreamExt;

        let mut turn = crate::Turn::default();
        let mut completed = false;

        while let Some(event) = self.next().await {
            match event? {
                ThreadEvent::ItemCompleted { item } => {
                    if let Some(message) = item.as_agent_message() {
                        turn.final_response = message.text.clone();
                    }
                    turn.items.push(item);
                }
                ThreadEvent::TurnCompleted { usage } => {
                    turn.usage = Some(usage);
                    completed = true;
                }
                ThreadEvent::TurnFailed { error } => {
                    return Err(Error::TurnFailed {
                        message: error.message,
                    });
                }
                _ => {}
            }
        }

        if !completed {
            return Err(Error::IncompleteTurn);
        }
        Ok(turn)
    }
}

/// Pump lines from the source into the channel until the sequence or the
/// consumer goes away.
async fn read_loop<S>(
    source: &mut S,
    tx: &mpsc::Sender<Result<ThreadEvent>>,
    thread_id: &SharedThreadId,
) where
    S: LineSource,
{
    loop {
        if tx.is_closed() {
            return;
        }
        match source.next_line().await {
            Ok(Some(line)) => {
                let event = match ThreadEvent::decode(&line) {
                    Ok(event) => event,
                    Err(err) => {
                        let _ = tx.send(Err(err)).await;
                        return;
                    }
                };
                if let ThreadEvent::ThreadStarted { thread_id: id } = &event {
                    thread_id.capture(id);
                }
                if tx.send(Ok(event)).await.is_err() {
                    return;
                }
            }
            Ok(None) => return,
            Err(err) => {
                let _ = tx.send(Err(err)).await;
                return;
            }
        }
    }
}

impl Stream for ThreadEventStream {
    type Item = Result<ThreadEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for ThreadEventStream {
    fn drop(&mut self) {
        // Aborting the task drops the source and schema file, which tear
        // down the subprocess and the temporary directory.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ThreadEventStream>();
    }
}
