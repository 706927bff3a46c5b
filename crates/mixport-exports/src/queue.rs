//! Bounded, closable FIFO queue between an event producer and the streamer.
//!
//! The queue is a thin wrapper over a bounded [`tokio::sync::mpsc`] channel.
//! Producers hold an [`EventSender`] and may run on async tasks or plain
//! threads. The consuming side, [`EventQueue`], is read by the streamer and
//! also implements [`futures::Stream`].
//!
//! The queue closes when every sender has been dropped (or consumed through
//! [`EventSender::close`]). Records already queued at that point are still
//! delivered; [`EventQueue::recv`] returns `None` only once the queue is both
//! closed and drained.
//!
//! # Examples
//!
//! ```
//! use mixport_exports::{event_queue, EventRecord};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (tx, mut queue) = event_queue(8);
//!
//! tx.send(EventRecord::with_event_id("1")).await.unwrap();
//! tx.close();
//!
//! assert_eq!(queue.recv().await.unwrap().event_id(), Some("1"));
//! assert!(queue.recv().await.is_none());
//! # }
//! ```

use crate::record::EventRecord;
use futures::Stream;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Creates a bounded event queue holding at most `capacity` pending records.
///
/// # Panics
///
/// Panics if `capacity` is zero. Use
/// [`ExportConfig::validate`](crate::ExportConfig::validate) to reject a
/// zero capacity coming from configuration.
#[must_use]
pub fn event_queue<T>(capacity: usize) -> (EventSender<T>, EventQueue<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender { inner: tx }, EventQueue { inner: rx })
}

/// Producer handle of an event queue.
///
/// Cloning the sender yields another producer for the same queue.
pub struct EventSender<T = EventRecord> {
    inner: mpsc::Sender<T>,
}

impl<T> EventSender<T> {
    /// Enqueues a record, waiting while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`QueueClosed`] with the record if the consumer is gone.
    pub async fn send(&self, record: T) -> Result<(), QueueClosed<T>> {
        self.inner
            .send(record)
            .await
            .map_err(|mpsc::error::SendError(record)| QueueClosed(record))
    }

    /// Enqueues a record from a thread outside the async runtime, blocking
    /// while the queue is full.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async execution context.
    ///
    /// # Errors
    ///
    /// Returns [`QueueClosed`] with the record if the consumer is gone.
    pub fn blocking_send(&self, record: T) -> Result<(), QueueClosed<T>> {
        self.inner
            .blocking_send(record)
            .map_err(|mpsc::error::SendError(record)| QueueClosed(record))
    }

    /// Enqueues a record without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`TrySendError::Full`] if the queue is at capacity and
    /// [`TrySendError::Closed`] if the consumer is gone. Both hand the
    /// record back.
    pub fn try_send(&self, record: T) -> Result<(), TrySendError<T>> {
        self.inner.try_send(record).map_err(|e| match e {
            mpsc::error::TrySendError::Full(record) => TrySendError::Full(record),
            mpsc::error::TrySendError::Closed(record) => TrySendError::Closed(record),
        })
    }

    /// Returns `true` if the consuming side has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Signals that this producer will send nothing more.
    ///
    /// The queue closes once every clone of the sender has been closed or
    /// dropped.
    pub fn close(self) {
        drop(self);
    }
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for EventSender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSender").finish_non_exhaustive()
    }
}

/// Consumer handle of an event queue.
pub struct EventQueue<T = EventRecord> {
    inner: mpsc::Receiver<T>,
}

impl<T> EventQueue<T> {
    /// Receives the next record, waiting while the queue is empty and open.
    ///
    /// Returns `None` once the queue is closed and every queued record has
    /// been received.
    pub async fn recv(&mut self) -> Option<T> {
        self.inner.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv) for use outside the runtime.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async execution context.
    pub fn blocking_recv(&mut self) -> Option<T> {
        self.inner.blocking_recv()
    }
}

impl<T> Stream for EventQueue<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().inner.poll_recv(cx)
    }
}

impl<T> fmt::Debug for EventQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue").finish_non_exhaustive()
    }
}

/// Returned when sending to a queue whose consumer has been dropped.
///
/// Holds the record that could not be delivered.
#[derive(PartialEq, Eq)]
pub struct QueueClosed<T>(pub T);

impl<T> fmt::Debug for QueueClosed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueClosed").finish_non_exhaustive()
    }
}

impl<T> fmt::Display for QueueClosed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event queue is closed")
    }
}

impl<T> std::error::Error for QueueClosed<T> {}

/// Returned by [`EventSender::try_send`].
#[derive(PartialEq, Eq)]
pub enum TrySendError<T> {
    /// The queue is at capacity.
    Full(T),
    /// The consumer has been dropped.
    Closed(T),
}

impl<T> TrySendError<T> {
    /// Returns the record that could not be sent.
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(record) | Self::Closed(record) => record,
        }
    }
}

impl<T> fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("Full(..)"),
            Self::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

impl<T> fmt::Display for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => write!(f, "event queue is full"),
            Self::Closed(_) => write!(f, "event queue is closed"),
        }
    }
}

impl<T> std::error::Error for TrySendError<T> {}
