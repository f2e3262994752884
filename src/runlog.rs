//! Append-only generation log.
//!
//! One line per settled tool, kept across runs:
//!
//! ```text
//! 2026-03-01T09:15:02Z SUCCESS word-counter (Word Counter)
//! 2026-03-01T09:15:04Z FAILED  stopwatch (Stopwatch): model error: rate limited by model API
//! ```
//!
//! Each line goes out in a single `write` on a file opened in append mode, so
//! lines from concurrent tools never interleave.

use chrono::{SecondsFormat, Utc};
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Outcome of one tool as recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStatus {
    Success,
    Failed,
}

impl LogStatus {
    fn label(self) -> &'static str {
        match self {
            LogStatus::Success => "SUCCESS",
            LogStatus::Failed => "FAILED ",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line. `detail` is the error message for failures.
    pub async fn record(
        &self,
        status: LogStatus,
        slug: &str,
        name: &str,
        detail: Option<&str>,
    ) -> io::Result<()> {
        let line = format_line(&timestamp(), status, slug, name, detail);
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn format_line(
    timestamp: &str,
    status: LogStatus,
    slug: &str,
    name: &str,
    detail: Option<&str>,
) -> String {
    // Messages are kept to one line so the log stays greppable
    match detail {
        Some(detail) => format!(
            "{timestamp} {} {slug} ({name}): {}\n",
            status.label(),
            detail.replace(['\n', '\r'], " ")
        ),
        None => format!("{timestamp} {} {slug} ({name})\n", status.label()),
    }
}
