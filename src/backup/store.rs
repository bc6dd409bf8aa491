use super::types::{BackupError, DATE_FORMAT, Result, parse_snapshot_dir_name};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Dated snapshot directories under a destination root.
///
/// The filesystem owns the snapshot set: nothing is cached across cycles,
/// every cycle re-lists from scratch, so external mutation between runs is
/// tolerated. Directory names in `YYYY-MM-DD` form are the canonical
/// serialization of snapshot dates; anything else under the root is
/// ignored.
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a snapshot for `date` lives in (whether or not it exists).
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.root.join(date.format(DATE_FORMAT).to_string())
    }

    /// List existing snapshot dates, sorted ascending.
    pub async fn list(&self) -> Result<Vec<NaiveDate>> {
        let mut dates = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(date) = parse_snapshot_dir_name(name) {
                dates.push(date);
            }
        }

        dates.sort_unstable();
        Ok(dates)
    }

    /// Remove the snapshot directory for `date`.
    ///
    /// A snapshot that does not exist is a no-op, not an error.
    pub async fn delete(&self, date: NaiveDate) -> Result<()> {
        let path = self.path_for(date);
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => {
                info!("Removed old snapshot {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackupError::Delete { date, source: e }),
        }
    }

    /// Best-effort deletion of a set of snapshots.
    ///
    /// A failed delete is reported and counted but never aborts the
    /// remaining deletions. Returns the number of failures.
    pub async fn prune(&self, doomed: &BTreeSet<NaiveDate>) -> usize {
        let mut failed = 0;
        for &date in doomed {
            if let Err(e) = self.delete(date).await {
                warn!("{e}");
                failed += 1;
            }
        }
        failed
    }
}
