//! Process-wide `tracing` subscriber: a console layer plus a rotating,
//! non-blocking file layer.

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LogSetupError {
    #[error("Invalid log filter {directive:?}: {source}")]
    Filter {
        directive: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("Failed to create log directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create log file appender: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),
    #[error("Logging already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `"info"` or
    /// `"roi_features=debug,info"`.
    pub level: String,
    pub directory: PathBuf,
    /// Files are named `<file_prefix>.<date>.log`.
    pub file_prefix: String,
    /// Rotated files kept on disk.
    pub max_files: usize,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: PathBuf::from("logs"),
            file_prefix: "roi_features".to_string(),
            max_files: 5,
        }
    }
}

impl LogSettings {
    pub fn new(level: &str, file_prefix: &str) -> Self {
        Self {
            level: level.to_string(),
            file_prefix: file_prefix.to_string(),
            ..Self::default()
        }
    }

    /// `RUST_LOG` when set, otherwise [`LogSettings::level`].
    fn filter(&self) -> Result<EnvFilter, LogSetupError> {
        EnvFilter::try_from_default_env().or_else(|_| parse_filter(&self.level))
    }

    /// Daily-rotated appender; creates the directory when missing.
    fn file_appender(&self) -> Result<RollingFileAppender, LogSetupError> {
        std::fs::create_dir_all(&self.directory).map_err(|source| LogSetupError::Directory {
            path: self.directory.clone(),
            source,
        })?;

        Ok(RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(&self.file_prefix)
            .filename_suffix("log")
            .max_log_files(self.max_files)
            .build(&self.directory)?)
    }
}

fn parse_filter(directive: &str) -> Result<EnvFilter, LogSetupError> {
    EnvFilter::try_new(directive).map_err(|source| LogSetupError::Filter {
        directive: directive.to_string(),
        source,
    })
}

/// Installs the global subscriber. Warnings and errors also go to stderr.
///
/// Fails with [`LogSetupError::AlreadyInitialized`] on a second call; the
/// first installation stays in place.
pub fn setup_logging(settings: &LogSettings) -> Result<(), LogSetupError> {
    if LOG_GUARD.get().is_some() {
        return Err(LogSetupError::AlreadyInitialized);
    }
    let filter = settings.filter()?;
    let (file_writer, guard) = tracing_appender::non_blocking(settings.file_appender()?);
    LOG_GUARD
        .set(guard)
        .map_err(|_| LogSetupError::AlreadyInitialized)?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stdout.and(std::io::stderr.with_min_level(Level::WARN)));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LogSetupError::AlreadyInitialized)
}
