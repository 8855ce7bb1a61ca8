//! Per-task outcome log
//!
//! One line per finished task, appended in completion order:
//!
//! ```text
//! [14:03:59] abc.onion -> SUCCESS (Saved HTML, IMG, URLs)
//! [14:04:12] def.onion -> FAIL (render timed out after 40s)
//! ```

use crate::state::TaskStatus;
use crate::target::Destination;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Timestamp format used in log lines
const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// The result of one crawl task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeRecord {
    /// Local wall-clock time the task finished
    pub timestamp: DateTime<Local>,

    /// Destination as written in the target list
    pub destination: String,

    pub status: TaskStatus,

    /// Human readable explanation of the status
    pub detail: String,
}

impl OutcomeRecord {
    /// Creates a record stamped with the current time
    pub fn now(destination: &Destination, status: TaskStatus, detail: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            destination: destination.as_str().to_string(),
            status,
            detail: detail.into(),
        }
    }

    /// Formats the record as a single log line, without the trailing newline
    pub fn to_log_line(&self) -> String {
        format!(
            "[{}] {} -> {} ({})",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.destination,
            self.status,
            self.detail
        )
    }
}

/// Append-only outcome log shared by all workers
///
/// Appends are serialized through a mutex; the file is opened and closed
/// for every record, so nothing stays open between tasks.
#[derive(Debug)]
pub struct OutcomeLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl OutcomeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a record to the log file
    ///
    /// Failures to open or write the file are logged and otherwise ignored;
    /// they never change the outcome of the task being recorded.
    pub async fn record(&self, record: &OutcomeRecord) {
        let mut line = record.to_log_line();
        line.push('\n');

        let _guard = self.lock.lock().await;
        if let Err(e) = self.append(line.as_bytes()).await {
            tracing::warn!(
                "Failed to append to outcome log {}: {}",
                self.path.display(),
                e
            );
        }
    }

    async fn append(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await
    }
}
