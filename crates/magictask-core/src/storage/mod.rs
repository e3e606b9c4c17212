mod app_state;
mod config;
pub mod database;
mod task_store;

pub use app_state::{
    default_document, merge_documents, AppStatePatch, AppStateStore, PersistedAppState,
    PomodoroPatch, PomodoroState,
};
pub use config::{Config, LoggingConfig, NotificationsConfig, StorageConfig};
pub use database::Database;
pub use task_store::TaskStore;

use std::path::PathBuf;

use crate::error::{ConfigError, CoreError};

/// Returns the data directory, creating it if needed.
///
/// `MAGICTASK_DATA_DIR` wins when set. Otherwise `~/.config/magictask`, or
/// `~/.config/magictask-dev` with `MAGICTASK_ENV=dev`.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let dir = match std::env::var_os("MAGICTASK_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir().ok_or(ConfigError::NoDataDir)?.join(".config");
            let env = std::env::var("MAGICTASK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("magictask-dev")
            } else {
                base_dir.join("magictask")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
