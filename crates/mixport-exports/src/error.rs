//! Error types for mixport-exports operations.

use std::io;
use thiserror::Error;

/// The error type for mixport-exports operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A record could not be represented as JSON.
    #[error("failed to encode record {record}: {source}")]
    Encode {
        /// Zero-based position of the record in the stream.
        record: u64,
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The output sink rejected a write or flush.
    #[error("write to output sink failed: {0}")]
    Write(#[source] io::Error),

    /// IO error outside the sink itself, such as creating or renaming an export file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A line of NDJSON input could not be decoded.
    #[error("malformed JSON at line {line_number}: {source}")]
    Decode {
        /// The 1-based line number of the offending line.
        line_number: usize,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A file export was cancelled before the queue drained.
    #[error("export cancelled after {records} records")]
    Cancelled {
        /// Number of records written before cancellation.
        records: u64,
    },
}

/// A specialized Result type for mixport-exports operations.
pub type Result<T> = std::result::Result<T, Error>;
