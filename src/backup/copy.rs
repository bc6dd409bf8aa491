use super::types::{BackupError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of one tree copy.
#[derive(Debug, Clone, Default)]
pub struct CopyReport {
    pub files_total: u64,
    pub files_copied: u64,
    pub files_failed: u64,
}

/// Copy the source tree into `dest`, file for file, preserving relative
/// paths and permissions.
///
/// Restartable: copying into an already existing dated directory re-copies
/// over whatever is there. Per-file failures are logged and counted but do
/// not abort the copy; only a copy that cannot start at all (unreadable
/// source root, destination cannot be created) is an error.
pub async fn copy_tree(source: &Path, dest: &Path) -> Result<CopyReport> {
    tokio::fs::create_dir_all(dest).await.map_err(|e| {
        BackupError::Copy(format!("cannot create {}: {e}", dest.display()))
    })?;

    let walk = walk_source(source).await?;

    // Recreate the directory structure first so empty directories survive.
    for rel in &walk.dirs {
        tokio::fs::create_dir_all(dest.join(rel)).await.map_err(|e| {
            BackupError::Copy(format!("cannot create {}: {e}", dest.join(rel).display()))
        })?;
    }

    let mut report = CopyReport {
        files_total: walk.files.len() as u64,
        ..CopyReport::default()
    };
    let mut next_progress_pct = 10;

    for rel in &walk.files {
        let from = source.join(rel);
        let to = dest.join(rel);
        match tokio::fs::copy(&from, &to).await {
            Ok(_) => report.files_copied += 1,
            Err(e) => {
                warn!("Failed to copy {}: {e}", from.display());
                report.files_failed += 1;
            }
        }

        let done = report.files_copied + report.files_failed;
        let pct = done * 100 / report.files_total.max(1);
        if pct >= next_progress_pct {
            info!(
                "Backup progress: {pct}% ({done}/{} files)",
                report.files_total
            );
            next_progress_pct = (pct / 10 + 1) * 10;
        }
    }

    info!(
        "Backup complete into {}: {} copied, {} failed of {} files",
        dest.display(),
        report.files_copied,
        report.files_failed,
        report.files_total
    );
    Ok(report)
}

struct SourceWalk {
    dirs: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

/// Walk the source tree iteratively, collecting relative directory and
/// file paths.
///
/// An unreadable source root fails the walk; an unreadable subdirectory or
/// entry is reported and skipped, matching the best-effort copy contract.
async fn walk_source(source: &Path) -> Result<SourceWalk> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    let mut pending = vec![PathBuf::new()];

    while let Some(rel_dir) = pending.pop() {
        let mut dir = match tokio::fs::read_dir(source.join(&rel_dir)).await {
            Ok(dir) => dir,
            Err(e) if rel_dir.as_os_str().is_empty() => {
                return Err(BackupError::Copy(format!(
                    "cannot read source {}: {e}",
                    source.display()
                )));
            }
            Err(e) => {
                warn!(
                    "Skipping unreadable directory {}: {e}",
                    source.join(&rel_dir).display()
                );
                continue;
            }
        };

        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(
                        "Skipping rest of unreadable directory {}: {e}",
                        source.join(&rel_dir).display()
                    );
                    break;
                }
            };
            let rel = rel_dir.join(entry.file_name());
            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(e) => {
                    warn!("Skipping unreadable entry {}: {e}", rel.display());
                    continue;
                }
            };
            if file_type.is_dir() {
                dirs.push(rel.clone());
                pending.push(rel);
            } else if file_type.is_file() {
                files.push(rel);
            } else {
                debug!("Skipping non-regular file {}", rel.display());
            }
        }
    }

    Ok(SourceWalk { dirs, files })
}
