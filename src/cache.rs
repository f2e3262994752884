//! Per-tool generation cache.
//!
//! Model calls are the slow and billable part of a build. Every successful
//! generation is stored as `<cache_dir>/<slug>.json` so later builds can
//! re-render pages (after a template change, say) without asking the model
//! again.
//!
//! ## Entries
//!
//! One file per tool, keyed by slug, holding a serialized
//! [`GenerationRecord`]. Entries never expire. The only ways to replace one
//! are `build --force` (regenerate everything) or deleting the file.
//!
//! ## Corruption
//!
//! A file that cannot be read or parsed is logged and treated as absent, so
//! the next non-refresh build regenerates it and overwrites the bad copy.
//!
//! Reads and writes go through `tokio::fs`: entries are touched from inside
//! the concurrent per-tool futures.

use crate::types::GenerationRecord;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

/// Directory of cached [`GenerationRecord`]s.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry for `slug`.
    pub fn entry_path(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{slug}.json"))
    }

    /// Whether an entry file exists. Does not check that it parses.
    pub fn has(&self, slug: &str) -> bool {
        self.entry_path(slug).is_file()
    }

    /// Load the entry for `slug`.
    ///
    /// Returns `None` when the entry is missing, unreadable or corrupt.
    pub async fn read(&self, slug: &str) -> Option<GenerationRecord> {
        let path = self.entry_path(slug);
        let content = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("cannot read cache entry {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("ignoring corrupt cache entry {}: {e}", path.display());
                None
            }
        }
    }

    /// Store the entry for `slug`, creating the cache directory if needed.
    pub async fn write(&self, slug: &str, record: &GenerationRecord) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.entry_path(slug), json).await
    }
}

/// Summary of cache use for a build run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub cached: u32,
    pub generated: u32,
    pub failed: u32,
}

impl CacheStats {
    pub fn total(&self) -> u32 {
        self.cached + self.generated + self.failed
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failed > 0 {
            write!(
                f,
                "{} cached, {} generated, {} failed ({} total)",
                self.cached,
                self.generated,
                self.failed,
                self.total()
            )
        } else if self.cached > 0 {
            write!(
                f,
                "{} cached, {} generated ({} total)",
                self.cached,
                self.generated,
                self.total()
            )
        } else {
            write!(f, "{} generated", self.generated)
        }
    }
}
