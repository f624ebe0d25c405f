use std::path::Path;

use calculock_core::{AppId, BlockDuration};
use serde::Serialize;

use super::load_config;

#[derive(Serialize)]
struct DurationEntry {
    minutes: u32,
    label: String,
    default: bool,
}

#[derive(Serialize)]
struct CatalogView {
    apps: Vec<AppId>,
    durations: Vec<DurationEntry>,
}

pub fn run(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    let default = config.default_duration();
    let view = CatalogView {
        apps: config.catalog().apps().to_vec(),
        durations: config
            .durations()
            .into_iter()
            .map(|d: BlockDuration| DurationEntry {
                minutes: d.minutes(),
                label: d.label(),
                default: d == default,
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
