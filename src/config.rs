use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backup::{BackupError, RetentionConfig};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backup: BackupSettings,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSettings {
    pub source_folder: PathBuf,
    pub destination_folder: PathBuf,
    /// Minimum free space on the destination disk before a cycle may run.
    #[serde(default = "default_required_disk_space_gb")]
    pub required_disk_space_gb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between due-checks.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    /// Run marker location; defaults to `last_run_date.txt` next to the
    /// executable when unset.
    #[serde(default)]
    pub marker_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_required_disk_space_gb() -> f64 {
    1.0
}

fn default_check_interval_secs() -> u64 {
    60
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
            marker_path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::backup::Result<()> {
        if self.backup.source_folder.as_os_str().is_empty() {
            return Err(BackupError::Config(
                "backup.source_folder must not be empty".into(),
            ));
        }
        if self.backup.destination_folder.as_os_str().is_empty() {
            return Err(BackupError::Config(
                "backup.destination_folder must not be empty".into(),
            ));
        }
        if self.backup.required_disk_space_gb < 0.0 {
            return Err(BackupError::Config(
                "backup.required_disk_space_gb must not be negative".into(),
            ));
        }
        if self.scheduler.check_interval_secs == 0 {
            return Err(BackupError::Config(
                "scheduler.check_interval_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let yaml = r#"
backup:
  source_folder: /data/projects
  destination_folder: /mnt/backup
  required_disk_space_gb: 5.0
retention:
  delete_weekly_backups: true
  delete_monthly_backups: true
  delete_yearly_backups: false
scheduler:
  check_interval_secs: 30
logging:
  level: debug
  format: text
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();

        assert_eq!(config.backup.source_folder, PathBuf::from("/data/projects"));
        assert_eq!(config.backup.required_disk_space_gb, 5.0);
        assert!(config.retention.delete_weekly_backups);
        assert!(!config.retention.delete_yearly_backups);
        assert_eq!(config.scheduler.check_interval_secs, 30);
        assert!(config.scheduler.marker_path.is_none());
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let yaml = r#"
backup:
  source_folder: /src
  destination_folder: /dst
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();

        // Pruning is opt-in.
        assert!(!config.retention.delete_weekly_backups);
        assert!(!config.retention.delete_monthly_backups);
        assert!(!config.retention.delete_yearly_backups);
        assert_eq!(config.scheduler.check_interval_secs, 60);
        assert_eq!(config.backup.required_disk_space_gb, 1.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn rejects_zero_check_interval() {
        let yaml = r#"
backup:
  source_folder: /src
  destination_folder: /dst
scheduler:
  check_interval_secs: 0
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_source() {
        let yaml = r#"
backup:
  source_folder: ""
  destination_folder: /dst
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }
}
