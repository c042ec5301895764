//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod list;
pub mod output;
pub mod process;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use rcpt_core::models::config::RcptConfig;
use rcpt_core::SqliteStore;

/// Global options passed to every subcommand.
pub struct Context {
    /// Explicit `--config` path.
    pub config_path: Option<PathBuf>,
    /// Explicit `--db` path.
    pub db_path: Option<PathBuf>,
}

impl Context {
    /// Configuration file in effect: `--config`, else the per-user default.
    pub fn config_file(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(default_config_path)
    }

    /// Load the configuration, falling back to defaults when the file is absent.
    ///
    /// An explicit `--config` path must exist.
    pub fn load_config(&self) -> anyhow::Result<RcptConfig> {
        if let Some(path) = &self.config_path {
            return RcptConfig::from_file(path).map_err(|e| {
                anyhow::anyhow!("Failed to load config {}: {}", path.display(), e)
            });
        }

        let path = default_config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            Ok(RcptConfig::from_file(&path)?)
        } else {
            Ok(RcptConfig::default())
        }
    }

    /// Database file in effect: `--db`, else the configured path, else the
    /// per-user default.
    pub fn database_file(&self, config: &RcptConfig) -> PathBuf {
        self.db_path
            .clone()
            .or_else(|| config.store.database_path.clone())
            .unwrap_or_else(default_database_path)
    }

    /// Open (creating if needed) the receipt database.
    pub fn open_store(&self, config: &RcptConfig) -> anyhow::Result<SqliteStore> {
        let path = self.database_file(config);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        SqliteStore::open(&path)
            .map_err(|e| anyhow::anyhow!("Failed to open database {}: {}", path.display(), e))
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rcpt")
        .join("config.json")
}

pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rcpt")
        .join("receipts.db")
}

/// File name for display, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
