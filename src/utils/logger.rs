//! Logging initialization and configuration.
//!
//! Stdout carries protocol replies, so logs never go there. By default they
//! are written to stderr; with `--log-dir` each run writes its own file in
//! that directory instead.
//!
//! # Configuration
//!
//! The log level can be controlled via the `RUST_LOG` environment variable:
//! - `RUST_LOG=debug` - Show debug and higher level logs (includes protocol traffic)
//! - `RUST_LOG=info` - Show info and higher level logs (default)
//! - `RUST_LOG=warn` - Show warnings and errors only
//! - `RUST_LOG=error` - Show errors only

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system.
///
/// Each run with a log directory creates a new file with a timestamp, e.g.:
/// `logs/rusty-shell.2024-12-06-14-30-25.log`. If the directory or file
/// cannot be created, logging falls back to stderr.
///
/// The returned guard flushes the non-blocking writer on drop and must be
/// held for the lifetime of the program.
pub fn init_logging(log_dir: Option<&Path>) -> WorkerGuard {
    let file = log_dir.and_then(|dir| match create_log_file(dir) {
        Ok(pair) => Some(pair),
        Err(e) => {
            eprintln!("Warning: Failed to create log file in {}: {}", dir.display(), e);
            None
        }
    });

    let (writer, guard, destination) = match file {
        Some((file, path)) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            (writer, guard, path.display().to_string())
        }
        None => {
            let (writer, guard) = tracing_appender::non_blocking(io::stderr());
            (writer, guard, "stderr".to_string())
        }
    };

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    // Default to "info" level if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .init();

    tracing::info!("Logging initialized - writing to {}", destination);
    guard
}

fn create_log_file(dir: &Path) -> io::Result<(fs::File, PathBuf)> {
    fs::create_dir_all(dir)?;
    // Format: rusty-shell.2024-12-06-14-30-25.log
    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    let path = dir.join(format!("rusty-shell.{}.log", timestamp));
    let file = fs::File::create(&path)?;
    Ok((file, path))
}
