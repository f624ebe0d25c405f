pub mod catalog;
pub mod config;
pub mod problems;
pub mod shell;

use std::path::Path;

use calculock_core::Config;

/// Load config from `path` if given, otherwise from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}
