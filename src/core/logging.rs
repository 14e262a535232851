//! Logging Module
//!
//! Provides:
//! - A human-readable stderr logger (stdout carries command output)
//! - A JSON file logger with daily rolling in the app data directory
//! - Redirection of `log` crate events into `tracing`
//! - miette error reporting configured for the terminal
//! - Background gzip compression of rolled log files

use std::fs;
use std::io;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use miette::Diagnostic;
use supports_color::Stream;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Rolling log file prefix
pub const LOG_FILE_NAME: &str = "storefront-query.log";

// ============================================================================
// Logging Initialization
// ============================================================================

/// Initialize the logging system.
///
/// `RUST_LOG` overrides the configured level. Returns the file writer's
/// `WorkerGuard` when file logging is enabled; keep it alive until exit so
/// buffered lines are flushed.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let env_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(supports_color::on(Stream::Stderr).is_some())
        .compact()
        .with_filter(env_filter());

    let log_dir = config.resolved_log_dir();
    let (file_layer, guard) = if config.file_logging && ensure_dir(&log_dir) {
        let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // JSON for easy ingestion
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .json()
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .with_target(true)
            .with_filter(env_filter());
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let subscriber = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer);
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to initialize tracing subscriber: {}", e);
    }

    // Route `log` macros into tracing
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {}", e);
    }

    init_miette();

    if guard.is_some() {
        // After init so the compressor's log macros are captured
        let dir = log_dir.clone();
        std::thread::spawn(move || compress_old_logs(&dir));
        log::debug!("File logging to {:?} (daily rolling)", log_dir.join(LOG_FILE_NAME));
    }

    guard
}

fn ensure_dir(dir: &Path) -> bool {
    if dir.exists() {
        return true;
    }
    match fs::create_dir_all(dir) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Failed to create logs directory {:?}: {}", dir, e);
            false
        }
    }
}

/// Whether a file in the log directory is a rolled log awaiting compression.
fn should_compress(name: &str, today_suffix: &str) -> bool {
    name.strip_prefix(LOG_FILE_NAME)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|date| date != today_suffix && !date.ends_with(".gz"))
}

/// Compress rolled log files, leaving today's file alone.
fn compress_old_logs(log_dir: &Path) {
    let today_suffix = chrono::Local::now().format("%Y-%m-%d").to_string();

    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !should_compress(name, &today_suffix) {
            continue;
        }
        match compress_file(&path) {
            Ok(()) => log::info!("Compressed old log: {:?}", path),
            Err(e) => log::warn!("Failed to compress old log {:?}: {}", path, e),
        }
    }
}

fn compress_file(path: &Path) -> io::Result<()> {
    let file = fs::File::open(path)?;
    let mut reader = io::BufReader::new(file);

    let mut gz_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No filename"))?
        .to_os_string();
    gz_name.push(".gz");
    let gz_path = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No parent directory"))?
        .join(gz_name);

    if gz_path.exists() {
        return Ok(());
    }

    let output = fs::File::create(&gz_path)?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)?;
    Ok(())
}

/// Configure miette's report handler for the current terminal.
fn init_miette() {
    let color = supports_color::on(Stream::Stderr);
    let colored = color.is_some();
    let truecolor = color.map_or(false, |level| level.has_16m);

    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(truecolor)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .color(colored)
                .build(),
        )
    }))
    .ok(); // Ignore if already set
}

// ============================================================================
// Diagnostic Error Types (miette integration)
// ============================================================================

/// Command-level diagnostic with an optional hint
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code("storefront::error"))]
pub struct AppError {
    message: String,

    #[help]
    help_text: Option<String>,
}

impl AppError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            help_text: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help_text = Some(help.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
