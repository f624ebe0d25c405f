use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "calculock-cli", version, about = "CalcuLock CLI")]
struct Cli {
    /// Use this config file instead of ~/.config/calculock/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive blocking session
    Shell,
    /// Print the app catalog and duration presets as JSON
    Catalog,
    /// Print the calculus problem pool (questions only) as JSON
    Problems,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Shell => commands::shell::run(config),
        Commands::Catalog => commands::catalog::run(config),
        Commands::Problems => commands::problems::run(),
        Commands::Config { action } => commands::config::run(action, config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
