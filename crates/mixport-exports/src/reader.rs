//! NDJSON reading operations.
//!
//! This module provides async functionality for reading an export back
//! line-by-line, with line number tracking for error reporting.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Async reader for NDJSON (newline-delimited JSON) data.
///
/// `JsonlReader` wraps an async reader and provides buffered reading of NDJSON
/// formatted data. It tracks line numbers to provide useful context in error
/// messages when parsing fails.
///
/// # Type Parameters
///
/// * `R` - The underlying async reader type. Must implement [`AsyncRead`] and [`Unpin`].
///
/// # Examples
///
/// ```
/// use mixport_exports::{EventRecord, JsonlReader};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> mixport_exports::Result<()> {
/// let data: &[u8] = b"{\"id\":\"0\"}\n{\"id\":\"1\"}\n";
/// let mut reader = JsonlReader::new(data);
///
/// let first: EventRecord = reader.read_line().await?.unwrap();
/// assert_eq!(first.event_id(), Some("0"));
/// assert_eq!(reader.line_number(), 1);
/// # Ok(())
/// # }
/// ```
pub struct JsonlReader<R> {
    /// Buffered reader wrapping the underlying async reader.
    reader: BufReader<R>,
    /// Current line number (1-based counting, 0 before any lines are read) for error reporting.
    line_number: usize,
    line: String,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::from_buf_reader(BufReader::new(reader))
    }

    /// Creates a new `JsonlReader` with a custom buffer capacity.
    ///
    /// This is useful when you know the typical line length of your NDJSON
    /// data and want to optimize buffer allocation.
    #[must_use]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self::from_buf_reader(BufReader::with_capacity(capacity, reader))
    }

    fn from_buf_reader(reader: BufReader<R>) -> Self {
        Self {
            reader,
            line_number: 0,
            line: String::new(),
        }
    }

    /// Reads and decodes the next non-blank line.
    ///
    /// Returns `Ok(None)` at end of input. Lines containing only whitespace
    /// are counted but skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if reading fails and [`Error::Decode`] if a line
    /// is not valid JSON for `T`.
    pub async fn read_line<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line).await? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return serde_json::from_str(trimmed)
                .map(Some)
                .map_err(|source| Error::Decode {
                    line_number: self.line_number,
                    source,
                });
        }
    }

    /// Returns the current line number.
    ///
    /// Returns 0 before any lines have been read. After reading, returns the
    /// 1-based line number of the last line read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}
