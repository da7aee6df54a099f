//! Tracing subscriber setup for the two run modes.

use crate::config::Config;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "pochi=debug,pochi_core=debug,rmcp=warn";
const LOG_FILE_PREFIX: &str = "pochi.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Recorder logging: readable output on stdout plus a daily JSON log file.
///
/// The returned guard flushes the file writer; keep it alive until exit.
pub fn init_gui() -> Option<WorkerGuard> {
    let (file_layer, guard) = match Config::log_dir() {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

/// Tool-server logging: stderr only, stdout carries the protocol.
pub fn init_mcp() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
