// src/logging.rs

use color_eyre::eyre::Result;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_error::ErrorLayer;
use tracing_subscriber::{self, EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = concat!(env!("CARGO_PKG_NAME"), ".log");
/// Crate-specific override for the log filter, consulted after RUST_LOG.
const LOG_ENV: &str = "PALISADE_LOGLEVEL";

/// Data directory for the log file: the platform-local app data dir, or
/// `./.data` when no home directory can be determined.
pub fn data_dir() -> PathBuf {
    ProjectDirs::from("com", "palisade", env!("CARGO_PKG_NAME"))
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".data"))
}

/// Initializes file-based logging with the tracing subscriber. Scans are
/// long-running background work, so everything goes to a file rather
/// than the terminal.
pub fn initialize_logging() -> Result<()> {
    let directory = data_dir();
    std::fs::create_dir_all(&directory)?;
    let log_file = std::fs::File::create(directory.join(LOG_FILE))?;

    let filter = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV))
        .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_filter(EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}
