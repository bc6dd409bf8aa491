use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Canonical serialization for snapshot directory names and the run marker.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Backup error types
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("preflight check failed: {0}")]
    Preflight(String),

    #[error("snapshot copy could not start: {0}")]
    Copy(String),

    #[error("failed to delete snapshot {date}: {source}")]
    Delete {
        date: NaiveDate,
        source: std::io::Error,
    },

    #[error("run marker unusable at {path:?}: {reason}")]
    Marker { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BackupError>;

/// Independent pruning toggles, one per bucket granularity.
///
/// Not mutually exclusive: every enabled granularity runs over the full
/// snapshot set in the same cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    pub delete_weekly_backups: bool,
    pub delete_monthly_backups: bool,
    pub delete_yearly_backups: bool,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        // Pruning is opt-in: a missing retention section deletes nothing.
        Self {
            delete_weekly_backups: false,
            delete_monthly_backups: false,
            delete_yearly_backups: false,
        }
    }
}

/// Parse a directory name as a snapshot date.
///
/// Only names that round-trip through the canonical `YYYY-MM-DD` form are
/// accepted, so `2024-1-3` or `2024-01-03.bak` never count as snapshots.
pub fn parse_snapshot_dir_name(name: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(name, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == name).then_some(date)
}
