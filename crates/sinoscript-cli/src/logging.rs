use std::fs;

use sinoscript_infrastructure::SinoScriptPaths;
use sinoscript_infrastructure::config_service::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Overrides the configured level, e.g. `SINOSCRIPT_LOG=sinoscript=debug`.
pub const LOG_ENV: &str = "SINOSCRIPT_LOG";

/// Installs the stderr layer and, when enabled, a daily log file.
///
/// The returned guard flushes the file writer on drop.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = || EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut guard = None;
    let file_layer = if config.file {
        match SinoScriptPaths::logs_dir() {
            Ok(dir) if fs::create_dir_all(&dir).is_ok() => {
                let appender = tracing_appender::rolling::daily(dir, "sinoscript.log");
                let (writer, worker_guard) = tracing_appender::non_blocking(appender);
                guard = Some(worker_guard);
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_filter(filter()),
                )
            }
            _ => None,
        }
    } else {
        None
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter());

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}
