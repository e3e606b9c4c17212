pub mod config;
pub mod focus;
pub mod state;
pub mod subtask;
pub mod task;
pub mod timer;
pub mod view;

use magictask_core::{Config, Database};

/// Open the task database, honoring `storage.database` from the config file.
pub fn open_database() -> Result<Database, Box<dyn std::error::Error>> {
    let path = Config::load()?.database_path()?;
    Ok(Database::open(path)?)
}
