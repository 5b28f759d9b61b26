//! Application configuration

use std::env;
use std::path::PathBuf;

use anyhow::Result;

pub const DEFAULT_SHARED_FILE: &str = "shared_election_data.txt";
pub const DEFAULT_LOG_FILTER: &str = "clear_ballot=info";
pub const DEFAULT_TITLE: &str = "General Election";

/// Application configuration loaded from environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory for shutdown snapshots and the shared file
    pub data_dir: PathBuf,
    /// Well-known snapshot file name, written on service shutdown
    pub shared_file: String,
    /// Fallback tracing filter when RUST_LOG is unset
    pub log_filter: String,
    /// Title for elections created without one
    pub default_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("."),
            shared_file: DEFAULT_SHARED_FILE.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as from_env, with the variable source injected
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = AppConfig::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = AppConfig {
            data_dir: non_empty("CLEAR_BALLOT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            shared_file: non_empty("CLEAR_BALLOT_SHARED_FILE").unwrap_or(defaults.shared_file),
            log_filter: non_empty("CLEAR_BALLOT_LOG").unwrap_or(defaults.log_filter),
            default_title: non_empty("CLEAR_BALLOT_TITLE").unwrap_or(defaults.default_title),
        };

        if config.shared_file.contains(['/', '\\']) {
            anyhow::bail!(
                "CLEAR_BALLOT_SHARED_FILE must be a file name, not a path: {}",
                config.shared_file
            );
        }

        Ok(config)
    }

    pub fn shared_file_path(&self) -> PathBuf {
        self.data_dir.join(&self.shared_file)
    }

    pub fn shutdown_snapshot_path(&self, election_id: u32) -> PathBuf {
        self.data_dir
            .join(format!("election_{}_shutdown.txt", election_id))
    }
}
