//! File logging
//!
//! The terminal UI owns stdout, so log output goes to a file in the user's
//! cache directory (`~/.cache/citycast/citycast.log` on Linux).

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::FmtSubscriber;

pub const LOG_FILE_NAME: &str = "citycast.log";

#[derive(clap::ValueEnum, Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to open log file: {0}")]
    Appender(#[from] InitError),

    #[error("A global log subscriber is already installed")]
    AlreadyInstalled,
}

/// XDG-compliant directory for the log file, if a home directory exists
pub fn default_log_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "citycast").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Creates `dir` if needed and opens a non-rotating appender in it
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender, LoggingError> {
    fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(dir)?;
    Ok(appender)
}

/// Installs the global subscriber writing to `dir`.
///
/// The returned guard flushes buffered lines on drop and must be held for
/// the life of the program.
pub fn setup_logging(level: LogLevel, dir: &Path) -> Result<WorkerGuard, LoggingError> {
    let (writer, guard) = tracing_appender::non_blocking(file_appender(dir)?);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(level))
        .with_writer(writer)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_| LoggingError::AlreadyInstalled)?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_level_maps_to_tracing_level() {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_file_appender_creates_missing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("nested").join("logs");

        file_appender(&nested).expect("Appender should open");

        assert!(nested.exists(), "Log directory should be created");
    }

    #[test]
    fn test_file_appender_rejects_file_as_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, "x").expect("Should write file");

        let result = file_appender(&blocker);
        assert!(matches!(result, Err(LoggingError::CreateDir { .. })));
    }

    #[test]
    fn test_default_log_dir_names_project() {
        if let Some(dir) = default_log_dir() {
            assert!(dir.to_string_lossy().contains("citycast"));
        }
        // Passes when no home directory is available (e.g. in CI)
    }
}
