//! NDJSON writing operations.
//!
//! This module provides an async writer that encodes one value per line,
//! compact JSON followed by `\n`.

use crate::error::{Error, Result};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Async writer for NDJSON (newline-delimited JSON) data.
///
/// `JsonlWriter` wraps an async writer in a [`BufWriter`]. Each value is
/// first encoded into a scratch buffer, so a value that fails to encode never
/// leaves a partial line in the output.
///
/// # Type Parameters
///
/// * `W` - The underlying async writer type. Must implement [`AsyncWrite`] and [`Unpin`].
///
/// # Examples
///
/// ```
/// use mixport_exports::{EventRecord, JsonlWriter};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> mixport_exports::Result<()> {
/// let mut writer = JsonlWriter::new(Vec::new());
/// writer.write(&EventRecord::with_event_id("1")).await?;
/// writer.flush().await?;
///
/// let output = writer.into_inner().into_inner();
/// assert_eq!(output, b"{\"id\":\"1\"}\n");
/// # Ok(())
/// # }
/// ```
pub struct JsonlWriter<W> {
    /// Buffered writer wrapping the underlying async writer.
    writer: BufWriter<W>,
    /// Reused encoding buffer for the current line.
    line: Vec<u8>,
    records_written: u64,
    bytes_written: u64,
}

impl<W: AsyncWrite + Unpin> JsonlWriter<W> {
    /// Creates a new `JsonlWriter` wrapping the given async writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self::from_buf_writer(BufWriter::new(writer))
    }

    /// Creates a new `JsonlWriter` with a custom buffer capacity in bytes.
    #[must_use]
    pub fn with_capacity(writer: W, capacity: usize) -> Self {
        Self::from_buf_writer(BufWriter::with_capacity(capacity, writer))
    }

    fn from_buf_writer(writer: BufWriter<W>) -> Self {
        Self {
            writer,
            line: Vec::new(),
            records_written: 0,
            bytes_written: 0,
        }
    }

    /// Encodes `value` as one JSON line and writes it.
    ///
    /// Returns the number of bytes in the line, including the trailing
    /// newline. The line may sit in the buffer until [`flush`](Self::flush).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the value cannot be represented as JSON,
    /// and [`Error::Write`] if the underlying writer fails.
    pub async fn write<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<usize> {
        self.line.clear();
        serde_json::to_writer(&mut self.line, value).map_err(|source| Error::Encode {
            record: self.records_written,
            source,
        })?;
        self.line.push(b'\n');

        self.writer
            .write_all(&self.line)
            .await
            .map_err(Error::Write)?;

        let len = self.line.len();
        self.records_written += 1;
        self.bytes_written += len as u64;
        Ok(len)
    }

    /// Flushes buffered lines through to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the underlying writer fails.
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await.map_err(Error::Write)
    }

    /// Number of lines written so far.
    #[must_use]
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Number of bytes written so far, including newlines.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Returns a reference to the underlying buffered writer.
    #[must_use]
    pub fn get_ref(&self) -> &BufWriter<W> {
        &self.writer
    }

    /// Consumes the writer, returning the underlying buffered writer.
    ///
    /// Note: This does not flush the buffer. Call [`flush`](Self::flush)
    /// before calling this method to ensure all data is written.
    #[must_use]
    pub fn into_inner(self) -> BufWriter<W> {
        self.writer
    }
}
