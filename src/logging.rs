use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Result, MediaTapError};

pub const LOG_FILE_NAME: &str = "mediatap.log";

/// `<base>/.mediatap/log`
pub fn log_dir(base: &Path) -> PathBuf {
    base.join(".mediatap").join("log")
}

pub fn log_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::INFO }
}

/// Console output stays terse; the daily log file carries source locations.
/// The returned guard flushes the file writer on drop and must outlive logging.
pub fn init(verbose: bool, base: &Path) -> Result<WorkerGuard> {
    let dir = log_dir(base);
    std::fs::create_dir_all(&dir)?;

    let (file_writer, guard) = non_blocking(rolling::daily(&dir, LOG_FILE_NAME));
    let level = log_level(verbose);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact();

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| MediaTapError::Config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!("Logging to {}", dir.join(LOG_FILE_NAME).display());
    Ok(guard)
}
