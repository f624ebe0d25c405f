use std::path::Path;

use clap::Subcommand;
use calculock_core::Config;

use super::load_config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "block.default_duration_min", "problems.seed")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
    /// Print the config file location
    Path,
}

fn save(config: &Config, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }
    Ok(())
}

pub fn run(action: ConfigAction, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = load_config(path)?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = load_config(path)?;
            config.set(&key, &value)?;
            save(&config, path)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = load_config(path)?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            save(&Config::default(), path)?;
            println!("config reset to defaults");
        }
        ConfigAction::Path => match path {
            Some(path) => println!("{}", path.display()),
            None => println!("{}", Config::path()?.display()),
        },
    }
    Ok(())
}
