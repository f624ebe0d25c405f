mod config;

pub use config::{
    BlockConfig, CatalogConfig, CategoriesConfig, ClockConfig, Config, ProblemsConfig,
};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/calculock[-dev]/` based on CALCULOCK_ENV.
///
/// Set CALCULOCK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CALCULOCK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("calculock-dev")
    } else {
        base_dir.join("calculock")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
