//! Logging Infrastructure
//!
//! Logs go to the in-app log panel, and optionally to daily log files.

use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logger
///
/// `RUST_LOG` wins over `log_level`. File output is enabled only when
/// `log_dir` exists.
pub fn init_logger(log_level: &str, log_dir: Option<&str>) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let file_layer = log_dir
        .map(Path::new)
        .filter(|dir| dir.exists())
        .map(|dir| {
            let file_appender = tracing_appender::rolling::daily(dir, "table-board");
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(false)
        });

    tracing_subscriber::registry()
        .with(tui_logger::tracing_subscriber_layer())
        .with(file_layer)
        .with(env_filter)
        .init();

    // log crate adapter for dependencies that use it
    let level = log_level.parse().unwrap_or(log::LevelFilter::Info);
    tui_logger::init_logger(level).ok();
    tui_logger::set_default_level(level);
}
