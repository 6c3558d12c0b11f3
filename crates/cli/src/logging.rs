use anyhow::Result;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the CLI
pub fn init_logging(log_level: Level, data_dir: &Path, no_file_log: bool) -> Result<()> {
    let level_str = log_level.as_str().to_lowercase();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("solara={level_str},solara_core={level_str},solara_http={level_str},solara_session={level_str}").into()
    });

    if no_file_log {
        // Only log to stderr
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
        return Ok(());
    }

    let log_file_path = get_log_file_path(data_dir);
    if let Some(parent) = log_file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .init();

    Ok(())
}

fn get_log_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join("solara.log")
}
