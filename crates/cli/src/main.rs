//! Solara CLI - loyalty program client

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "solara")]
#[command(about = "Customer client for the Solara loyalty program")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Data directory for the stored session, configuration and logs
    #[arg(short = 'd', long, global = true, env = "SOLARA_STATE_DIR")]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to solara.toml in the data directory)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = config::resolve_data_dir(cli.data_dir);
    logging::init_logging(cli.log_level.into(), &data_dir, cli.no_file_log)?;

    let config_path = cli
        .config
        .unwrap_or_else(|| data_dir.join("solara.toml"));
    let settings = config::Settings::load(&config_path)?;
    debug!("Loaded settings: {:?}", settings);

    if let Err(e) = cli.command.execute(&settings, &data_dir).await {
        error!("Command failed: {e}");
        eprintln!("{e}");
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
