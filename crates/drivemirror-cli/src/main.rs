//! DriveMirror CLI - command-line interface for the mirror engine
//!
//! Commands:
//! - `sync` - run a single synchronization cycle
//! - `run` - synchronize continuously on an interval
//! - `config` - view and validate the configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{config::ConfigCommand, run::RunCommand, sync::SyncCommand};
use drivemirror_core::config::Config;
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "drivemirror", version, about = "Bidirectional Google Drive folder mirror")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one synchronization cycle and exit
    Sync(SyncCommand),
    /// Synchronize continuously on an interval
    Run(RunCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path)?;

    // Verbosity flags override the configured level; RUST_LOG overrides both.
    let filter = match cli.verbose {
        0 => config.logging.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Sync(cmd) => cmd.execute(&config, format).await,
        Commands::Run(cmd) => cmd.execute(&config, format).await,
        Commands::Config(cmd) => cmd.execute(&config, &config_path, format).await,
    }
}
