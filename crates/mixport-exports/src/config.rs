//! Configuration for the export stage.
//!
//! Configuration is optional: [`ExportConfig::default`] is what
//! [`stream_json`](crate::stream_json) uses. Callers that want tuning can load
//! a small YAML document:
//!
//! ```yaml
//! queue-capacity: 4096
//! buffer-capacity: 65536
//! flush: on-finish
//! ```

use crate::error::{Error, Result};
use crate::queue::{EventQueue, EventSender, event_queue};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Default number of records the queue holds before producers wait.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default size in bytes of the writer buffer.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// When the streamer pushes buffered bytes through to the sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlushPolicy {
    /// Flush after every record, so each line reaches the sink as soon as it
    /// is encoded.
    #[default]
    EachRecord,
    /// Flush only when the buffer fills and once at the end of the stream.
    OnFinish,
}

/// Export stage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Capacity of queues created with [`ExportConfig::queue`].
    pub queue_capacity: usize,
    /// Size in bytes of the buffer between the encoder and the sink.
    pub buffer_capacity: usize,
    /// Flush behaviour of the streamer.
    pub flush: FlushPolicy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            flush: FlushPolicy::default(),
        }
    }
}

impl ExportConfig {
    /// Parses and validates configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the YAML is malformed, names unknown
    /// keys, or fails [`validate`](Self::validate).
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Config`] if its content is invalid.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_yaml_str(&content)
    }

    /// Saves configuration to a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails and [`Error::Io`] if
    /// the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Checks that all capacities are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if either capacity is zero.
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(Error::Config(
                "queue-capacity must be greater than zero".to_string(),
            ));
        }
        if self.buffer_capacity == 0 {
            return Err(Error::Config(
                "buffer-capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Creates an event queue with the configured capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the queue capacity is zero.
    pub fn queue<T>(&self) -> Result<(EventSender<T>, EventQueue<T>)> {
        self.validate()?;
        Ok(event_queue(self.queue_capacity))
    }
}
