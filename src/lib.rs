pub mod backup;
pub mod config;

// Re-export commonly used types
pub use backup::{
    BackupError, CopyReport, CycleOutcome, GateDecision, Result, RetentionConfig, RunMarker,
    Scheduler, SnapshotStore, compute_deletions, copy_tree,
};
pub use config::AppConfig;
