//! Backup engine
//!
//! Takes one full snapshot of the source tree per day into a dated
//! directory under the destination root, then prunes old snapshots:
//! - `store`: dated snapshot directories under the destination root
//! - `retention`: pure weekly/monthly/yearly pruning computation
//! - `copy`: best-effort tree copy into a fresh dated directory
//! - `marker`: persisted last-run date gating one cycle per day
//! - `scheduler`: the polling loop driving a cycle when one is due

pub mod copy;
pub mod marker;
pub mod retention;
pub mod scheduler;
pub mod store;
pub mod types;

pub use copy::{CopyReport, copy_tree};
pub use marker::{GateDecision, RunMarker};
pub use retention::compute_deletions;
pub use scheduler::{CycleOutcome, Scheduler};
pub use store::SnapshotStore;
pub use types::{BackupError, Result, RetentionConfig};
