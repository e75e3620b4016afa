// src/logging.rs
use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber.
///
/// When a log file is configured the returned guard flushes the non-blocking
/// writer on drop, so keep it alive until the program exits.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(&config.filter)?,
    };
    let registry = tracing_subscriber::registry().with(filter);

    match &config.file {
        Some(path) => {
            let (directory, file_name) = split_log_path(path)?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            registry
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()
                .map_err(|e| Error::Logging(e.to_string()))?;
            Ok(Some(guard))
        }
        None => {
            registry
                .with(fmt::layer())
                .try_init()
                .map_err(|e| Error::Logging(e.to_string()))?;
            Ok(None)
        }
    }
}

pub fn build_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .map_err(|e| Error::Logging(format!("invalid log filter '{}': {}", directives, e)))
}

fn split_log_path(path: &Path) -> Result<(&Path, &Path)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Logging(format!("log file has no name: {}", path.display())))?;
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok((directory, Path::new(file_name)))
}
