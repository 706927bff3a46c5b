//! Export stage for analytics event records.
//!
//! Records arrive on a bounded [`EventQueue`] filled by an upstream producer.
//! The streamer drains the queue in order and writes each record to an async
//! sink as one line of newline-delimited JSON.
//!
//! ```
//! use mixport_exports::{event_queue, stream_json, EventRecord};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> mixport_exports::Result<()> {
//! let (tx, mut queue) = event_queue(16);
//!
//! let producer = tokio::spawn(async move {
//!     for id in 0..3 {
//!         let mut event = EventRecord::with_event_id(id.to_string());
//!         event.insert("foo", "bar,baz");
//!         tx.send(event).await.unwrap();
//!     }
//! });
//!
//! let mut output = Vec::new();
//! stream_json(&mut output, &mut queue).await?;
//! producer.await.unwrap();
//!
//! assert_eq!(String::from_utf8(output).unwrap().lines().count(), 3);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod export;
pub mod queue;
pub mod reader;
pub mod record;
pub mod stream;
pub mod writer;

pub use config::{ExportConfig, FlushPolicy};
pub use error::{Error, Result};
pub use export::export_to_file;
pub use queue::{EventQueue, EventSender, QueueClosed, TrySendError, event_queue};
pub use reader::JsonlReader;
pub use record::{EVENT_ID_KEY, EventRecord};
pub use stream::{JsonStreamer, StreamOutcome, StreamSummary, stream_json};
pub use writer::JsonlWriter;
