//! Configuration module for the forum front end.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;

use crate::upload::UploadLimits;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one file per storage key
    pub data_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Maximum number of attachments per message
    pub max_files: usize,
    /// Maximum size of a single attachment in megabytes
    pub max_file_size_mb: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let data_dir = env::var("OPENFORUM_DATA_DIR")
            .unwrap_or_else(|_| "./data/storage".to_string())
            .into();

        let log_level = env::var("OPENFORUM_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());

        let max_files = env::var("OPENFORUM_MAX_FILES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(UploadLimits::DEFAULT_MAX_FILES);

        let max_file_size_mb = env::var("OPENFORUM_MAX_FILE_SIZE_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(UploadLimits::DEFAULT_MAX_SIZE_MB);

        Self {
            data_dir,
            log_level,
            max_files,
            max_file_size_mb,
        }
    }

    /// Upload limits derived from this configuration.
    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_files: self.max_files,
            max_size_mb: self.max_file_size_mb,
            allowed_types: None,
        }
    }
}
