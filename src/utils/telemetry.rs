// src/utils/telemetry.rs
use std::str::FromStr;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

/// Installs the global subscriber. With `to_file` set (dashboard mode) events go
/// to a daily-rolling file instead of stdout. Keep the guard alive until exit.
pub fn init(level: &str, log_dir: &str, to_file: bool) -> Option<WorkerGuard> {
    let level = Level::from_str(level).unwrap_or(Level::INFO);

    if to_file {
        let appender = tracing_appender::rolling::daily(log_dir, "notify_autobuy.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(writer)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt().with_max_level(level).init();
        None
    }
}
