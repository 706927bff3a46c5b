//! Crash-safe export of a queue to an NDJSON file.
//!
//! The export is streamed into a temporary file next to the target and
//! renamed over the target only once the queue has drained and the data is
//! synced. Renames within one filesystem are atomic on POSIX systems, so the
//! target path always holds either its previous content or a complete export.
//!
//! # Examples
//!
//! ```no_run
//! use mixport_exports::{export_to_file, EventRecord, ExportConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExportConfig::default();
//! let (tx, queue) = config.queue::<EventRecord>()?;
//!
//! let producer = tokio::spawn(async move {
//!     for id in 0..100 {
//!         tx.send(EventRecord::with_event_id(id.to_string())).await.ok();
//!     }
//! });
//!
//! let summary = export_to_file("events.jsonl", queue, &config, CancellationToken::new()).await?;
//! producer.await?;
//! assert_eq!(summary.records, 100);
//! # Ok(())
//! # }
//! ```

use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::queue::EventQueue;
use crate::stream::{JsonStreamer, StreamOutcome, StreamSummary};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Streams `queue` into the file at `path`, replacing it atomically.
///
/// A temporary file with a `.tmp` extension is created alongside `path`,
/// filled by the streamer, synced, and renamed over `path`.
///
/// # Errors
///
/// Returns an error if:
/// - The temporary file cannot be created, synced, or renamed ([`Error::Io`])
/// - A record fails to encode ([`Error::Encode`])
/// - Writing to the temporary file fails ([`Error::Write`])
/// - `cancel` fires before the queue drains ([`Error::Cancelled`])
///
/// In every error case the temporary file is removed on a best-effort basis
/// and an existing file at `path` is left unchanged.
pub async fn export_to_file<T, P>(
    path: P,
    mut queue: EventQueue<T>,
    config: &ExportConfig,
    cancel: CancellationToken,
) -> Result<StreamSummary>
where
    T: Serialize,
    P: AsRef<Path>,
{
    config.validate()?;
    let path = path.as_ref();
    let temp_path = make_temp_path(path);

    let streamer = JsonStreamer::new(config.clone()).with_cancellation(cancel);
    let result = write_to_temp_file(&temp_path, &streamer, &mut queue).await;

    let summary = match result {
        Ok(summary) if summary.outcome == StreamOutcome::Drained => summary,
        Ok(summary) => {
            warn!(path = %path.display(), records = summary.records, "Export cancelled; discarding partial file");
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Error::Cancelled {
                records: summary.records,
            });
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }
    };

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        warn!(path = %path.display(), error = %e, "Failed to commit export");
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    debug!(path = %path.display(), records = summary.records, bytes = summary.bytes, "Export committed");
    Ok(summary)
}

/// Creates the temporary path used while an export is in progress.
///
/// `.tmp` is appended to the existing extension, or used as the extension if
/// the path has none.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let new_extension = match path.extension() {
        Some(ext) => {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".tmp");
            new_ext
        }
        None => OsString::from("tmp"),
    };
    temp_path.set_extension(new_extension);
    temp_path
}

async fn write_to_temp_file<T: Serialize>(
    temp_path: &Path,
    streamer: &JsonStreamer,
    queue: &mut EventQueue<T>,
) -> Result<StreamSummary> {
    let mut file = File::create(temp_path).await?;
    let summary = streamer.run(&mut file, queue).await?;
    file.sync_all().await?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_temp_path_with_extension() {
        let path = Path::new("/path/to/events.jsonl");
        assert_eq!(make_temp_path(path), Path::new("/path/to/events.jsonl.tmp"));
    }

    #[test]
    fn make_temp_path_without_extension() {
        let path = Path::new("/path/to/events");
        assert_eq!(make_temp_path(path), Path::new("/path/to/events.tmp"));
    }

    #[test]
    fn make_temp_path_with_multiple_extensions() {
        let path = Path::new("export.2024-01-01.jsonl");
        assert_eq!(
            make_temp_path(path),
            Path::new("export.2024-01-01.jsonl.tmp")
        );
    }
}
