use super::types::{BackupError, DATE_FORMAT, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const MARKER_FILE_NAME: &str = "last_run_date.txt";

/// What the daily gate decided for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// No marker existed; it was created with today's date. The first
    /// observation only establishes the marker, so no backup runs.
    FirstRun,
    /// The last successful cycle ran on a different date.
    Due,
    /// A cycle already completed today.
    NotDue,
}

/// Persisted single-date marker gating one backup cycle per day.
///
/// The marker file is the only durable state of the process. It holds one
/// line, the last run date in `YYYY-MM-DD` form, and is only advanced
/// after a cycle completes.
pub struct RunMarker {
    path: PathBuf,
}

impl RunMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decide whether a cycle is due today.
    ///
    /// A garbled or unreadable marker is an error, never silently treated
    /// as absent: the next tick retries once the operator intervenes.
    pub async fn check(&self, today: NaiveDate) -> Result<GateDecision> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let text = content.trim();
                let last_run =
                    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| BackupError::Marker {
                        path: self.path.clone(),
                        reason: format!("unparseable date {text:?}: {e}"),
                    })?;
                debug!("Last run date: {last_run}, current date: {today}");
                if last_run == today {
                    Ok(GateDecision::NotDue)
                } else {
                    Ok(GateDecision::Due)
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.mark_done(today).await?;
                info!(
                    "Run marker created at {}; first cycle only establishes the marker, \
                     no backup runs today",
                    self.path.display()
                );
                Ok(GateDecision::FirstRun)
            }
            Err(e) => Err(BackupError::Marker {
                path: self.path.clone(),
                reason: format!("read failed: {e}"),
            }),
        }
    }

    /// Atomically record `today` as the last completed run.
    ///
    /// Written to a temporary file then renamed into place, so a crash
    /// mid-write can never leave the marker truncated or half-overwritten.
    pub async fn mark_done(&self, today: NaiveDate) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        let line = format!("{}\n", today.format(DATE_FORMAT));

        tokio::fs::write(&tmp, line).await.map_err(|e| BackupError::Marker {
            path: self.path.clone(),
            reason: format!("write to {} failed: {e}", tmp.display()),
        })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| BackupError::Marker {
                path: self.path.clone(),
                reason: format!("rename from {} failed: {e}", tmp.display()),
            })?;

        debug!("Last run date updated: {today}");
        Ok(())
    }
}

/// Default marker location: next to the running executable.
pub fn default_marker_path() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .unwrap_or(Path::new("."))
        .join(MARKER_FILE_NAME))
}
