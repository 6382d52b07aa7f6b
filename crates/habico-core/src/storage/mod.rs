mod config;
pub mod database;
pub mod keyring_store;
mod repository;
mod store;

pub use config::{AiConfig, ChatConfig, Config, DisplayConfig, InsightsConfig};
pub use database::Database;
pub use repository::HabitRepository;
pub use store::{MemoryStore, StateStore, StorageKey};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/habico[-dev]/` based on HABICO_ENV.
///
/// Set HABICO_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the data directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HABICO_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("habico-dev")
    } else {
        base_dir.join("habico")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
