//! Streaming records from a queue into an NDJSON sink.
//!
//! [`stream_json`] is the drain loop at the heart of the export stage: it
//! receives records one at a time until the queue is closed and drained,
//! and writes each as a line of compact JSON. [`JsonStreamer`] is the same
//! loop with configuration and an optional cancellation token.
//!
//! # Ordering
//!
//! Records are written in exactly the order they are received. The streamer
//! never batches records ahead of the sink beyond the writer's bounded
//! buffer, so memory use does not grow with the length of the stream.
//!
//! # Errors
//!
//! The first encode or write failure ends the call. Lines written before the
//! failure stay in the sink; nothing is retried or skipped.

use crate::config::{ExportConfig, FlushPolicy};
use crate::error::{Error, Result};
use crate::writer::JsonlWriter;
use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// How a streaming call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The queue was closed and every record in it was written.
    Drained,
    /// The cancellation token fired; records may remain in the queue.
    Cancelled,
}

/// Summary returned when a streaming call finishes without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    /// Number of records written.
    pub records: u64,
    /// Number of bytes written, including newlines.
    pub bytes: u64,
    /// Why the stream stopped.
    pub outcome: StreamOutcome,
}

impl StreamSummary {
    /// Returns `true` if the queue was fully drained.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.outcome == StreamOutcome::Drained
    }
}

/// Drains `source` into `sink` as NDJSON using the default configuration.
///
/// Returns once the source reports that it is closed and empty. Pass
/// `&mut queue` to keep ownership of an [`EventQueue`](crate::EventQueue).
///
/// # Errors
///
/// Returns [`Error::Encode`] if a record cannot be represented as JSON and
/// [`Error::Write`] if the sink rejects a write.
///
/// # Examples
///
/// ```
/// use mixport_exports::{event_queue, stream_json, EventRecord};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> mixport_exports::Result<()> {
/// let (tx, mut queue) = event_queue(4);
/// tx.send(EventRecord::with_event_id("0")).await.unwrap();
/// tx.close();
///
/// let mut output = Vec::new();
/// let summary = stream_json(&mut output, &mut queue).await?;
///
/// assert_eq!(summary.records, 1);
/// assert_eq!(output, b"{\"id\":\"0\"}\n");
/// # Ok(())
/// # }
/// ```
pub async fn stream_json<W, S>(sink: W, source: S) -> Result<StreamSummary>
where
    W: AsyncWrite + Unpin,
    S: Stream + Unpin,
    S::Item: Serialize,
{
    JsonStreamer::default().run(sink, source).await
}

/// Configurable NDJSON streamer.
///
/// # Examples
///
/// ```
/// use mixport_exports::{event_queue, EventRecord, ExportConfig, JsonStreamer, StreamOutcome};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> mixport_exports::Result<()> {
/// let (tx, mut queue) = event_queue::<EventRecord>(4);
/// let token = CancellationToken::new();
/// token.cancel();
///
/// let summary = JsonStreamer::new(ExportConfig::default())
///     .with_cancellation(token)
///     .run(tokio::io::sink(), &mut queue)
///     .await?;
///
/// assert_eq!(summary.outcome, StreamOutcome::Cancelled);
/// # drop(tx);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonStreamer {
    config: ExportConfig,
    cancel: Option<CancellationToken>,
}

impl JsonStreamer {
    /// Creates a streamer with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Stops the stream between records once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Drains `source` into `sink` as NDJSON.
    ///
    /// The sink is flushed before returning successfully but never shut down;
    /// closing it is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if a record cannot be represented as JSON and
    /// [`Error::Write`] if the sink rejects a write or flush.
    pub async fn run<W, S>(&self, sink: W, mut source: S) -> Result<StreamSummary>
    where
        W: AsyncWrite + Unpin,
        S: Stream + Unpin,
        S::Item: Serialize,
    {
        let mut writer = JsonlWriter::with_capacity(sink, self.config.buffer_capacity.max(1));
        debug!(flush = ?self.config.flush, "Starting NDJSON stream");

        let outcome = loop {
            let record = match self.next_record(&mut source).await {
                Next::Record(record) => record,
                Next::End => break StreamOutcome::Drained,
                Next::Cancelled => break StreamOutcome::Cancelled,
            };

            if let Err(e) = writer.write(&record).await {
                warn!(
                    records = writer.records_written(),
                    error = %e,
                    "NDJSON stream failed"
                );
                if matches!(e, Error::Encode { .. }) && self.config.flush == FlushPolicy::OnFinish {
                    // Keep whatever was encoded before the bad record.
                    if let Err(flush_err) = writer.flush().await {
                        warn!(error = %flush_err, "Flush after encode failure also failed");
                    }
                }
                return Err(e);
            }
            trace!(record = writer.records_written(), "Wrote record");

            if self.config.flush == FlushPolicy::EachRecord {
                writer.flush().await?;
            }
        };

        writer.flush().await?;

        let summary = StreamSummary {
            records: writer.records_written(),
            bytes: writer.bytes_written(),
            outcome,
        };
        match outcome {
            StreamOutcome::Drained => debug!(
                records = summary.records,
                bytes = summary.bytes,
                "NDJSON stream drained"
            ),
            StreamOutcome::Cancelled => warn!(
                records = summary.records,
                bytes = summary.bytes,
                "NDJSON stream cancelled before the queue drained"
            ),
        }
        Ok(summary)
    }

    /// Receives the next record. Cancellation wins over a ready record.
    async fn next_record<S>(&self, source: &mut S) -> Next<S::Item>
    where
        S: Stream + Unpin,
    {
        let next = match &self.cancel {
            None => source.next().await,
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => return Next::Cancelled,
                    next = source.next() => next,
                }
            }
        };
        next.map_or(Next::End, Next::Record)
    }
}

enum Next<T> {
    Record(T),
    End,
    Cancelled,
}
