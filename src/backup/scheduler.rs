use super::copy::{CopyReport, copy_tree};
use super::marker::{GateDecision, RunMarker, default_marker_path};
use super::retention::compute_deletions;
use super::store::SnapshotStore;
use super::types::{BackupError, Result};
use crate::config::AppConfig;
use chrono::{Local, NaiveDate};
use std::path::Path;
use std::time::Duration;
use sysinfo::Disks;
use tracing::{debug, error, info, warn};

/// What one tick of the scheduler did.
#[derive(Debug)]
pub enum CycleOutcome {
    /// First-ever tick: the run marker was created, nothing else ran.
    FirstRun,
    /// A cycle already completed today.
    NotDue,
    /// A full backup + retention pass ran and the marker was advanced.
    Completed {
        report: CopyReport,
        pruned: usize,
        failed_deletes: usize,
    },
}

/// Drives the check-then-maybe-backup loop.
///
/// Single task, no overlapping cycles: each tick runs to completion (or to
/// guard failure) before the next sleep. Guard and marker errors skip the
/// current cycle only; the next tick is the retry mechanism.
pub struct Scheduler {
    config: AppConfig,
    store: SnapshotStore,
    marker: RunMarker,
}

impl Scheduler {
    pub fn new(config: AppConfig) -> Result<Self> {
        let marker_path = match &config.scheduler.marker_path {
            Some(path) => path.clone(),
            None => default_marker_path()?,
        };
        let store = SnapshotStore::new(&config.backup.destination_folder);
        Ok(Self {
            config,
            store,
            marker: RunMarker::new(marker_path),
        })
    }

    /// Poll forever with a fixed interval between due-checks.
    pub async fn run(&self) {
        let period = Duration::from_secs(self.config.scheduler.check_interval_secs);
        info!("Scheduler started (check interval {period:?})");
        let mut interval = tokio::time::interval(period);

        loop {
            interval.tick().await;
            match self.run_once().await {
                Ok(CycleOutcome::NotDue) => debug!("Backup already ran today"),
                Ok(CycleOutcome::FirstRun) => {}
                Ok(CycleOutcome::Completed {
                    report,
                    pruned,
                    failed_deletes,
                }) => {
                    info!(
                        "Cycle completed: {}/{} files copied, {pruned} snapshot(s) pruned, \
                         {failed_deletes} delete failure(s)",
                        report.files_copied, report.files_total
                    );
                }
                Err(e) => error!("Cycle skipped: {e}"),
            }
        }
    }

    /// One due-check, optional backup + prune pass, and marker update.
    pub async fn run_once(&self) -> Result<CycleOutcome> {
        self.preflight().await?;

        let today = Local::now().date_naive();
        match self.marker.check(today).await? {
            GateDecision::FirstRun => Ok(CycleOutcome::FirstRun),
            GateDecision::NotDue => Ok(CycleOutcome::NotDue),
            GateDecision::Due => self.run_cycle(today).await,
        }
    }

    async fn run_cycle(&self, today: NaiveDate) -> Result<CycleOutcome> {
        info!("Starting backup cycle for {today}");

        let dest = self.store.path_for(today);
        let report = copy_tree(&self.config.backup.source_folder, &dest).await?;

        let (pruned, failed_deletes) = self.apply_retention(today).await;

        // Only now does the day count as done; a marker failure here means
        // the next tick re-runs the (restartable) cycle.
        self.marker.mark_done(today).await?;

        Ok(CycleOutcome::Completed {
            report,
            pruned,
            failed_deletes,
        })
    }

    /// List, compute deletions, prune. Never fails the cycle: retention is
    /// best-effort cleanup and the marker must still advance.
    async fn apply_retention(&self, today: NaiveDate) -> (usize, usize) {
        let snapshots = match self.store.list().await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                warn!("Retention skipped, cannot list snapshots: {e}");
                return (0, 0);
            }
        };

        let doomed = compute_deletions(&snapshots, today, &self.config.retention);
        if doomed.is_empty() {
            debug!("Retention: nothing to prune");
            return (0, 0);
        }

        info!("Retention flagged {} snapshot(s) for deletion", doomed.len());
        let failed = self.store.prune(&doomed).await;
        (doomed.len() - failed, failed)
    }

    /// Fast-fail guards: both paths must exist and the destination disk
    /// must have the configured minimum free space. No state is mutated on
    /// failure; the loop keeps ticking.
    async fn preflight(&self) -> Result<()> {
        let backup = &self.config.backup;

        if !tokio::fs::try_exists(&backup.source_folder).await? {
            return Err(BackupError::Preflight(format!(
                "source folder {} does not exist",
                backup.source_folder.display()
            )));
        }
        if !tokio::fs::try_exists(&backup.destination_folder).await? {
            return Err(BackupError::Preflight(format!(
                "destination folder {} does not exist",
                backup.destination_folder.display()
            )));
        }

        if backup.required_disk_space_gb > 0.0 {
            match destination_free_space_gb(&backup.destination_folder) {
                Some(free) if free < backup.required_disk_space_gb => {
                    return Err(BackupError::Preflight(format!(
                        "destination has {free:.2} GB free, {:.2} GB required",
                        backup.required_disk_space_gb
                    )));
                }
                Some(free) => debug!("Destination free space: {free:.2} GB"),
                None => warn!(
                    "Could not determine free space for {}; skipping disk space check",
                    backup.destination_folder.display()
                ),
            }
        }

        Ok(())
    }
}

/// Free space in GB on the disk holding `dest`, by longest mount-point
/// prefix match.
fn destination_free_space_gb(dest: &Path) -> Option<f64> {
    let dest = dest.canonicalize().ok()?;
    let disks = Disks::new_with_refreshed_list();
    disks
        .iter()
        .filter(|disk| dest.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| disk.available_space() as f64 / (1024.0 * 1024.0 * 1024.0))
}
