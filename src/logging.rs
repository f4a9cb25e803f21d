//! Tracing subscriber setup
//!
//! Console output goes to stderr so command output on stdout stays clean.
//! With a log directory configured, events are also written to a daily
//! rolling file; keep the returned guard alive until exit so it is flushed.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::core::{SeinsightError, SeinsightResult};

const LOG_FILE_PREFIX: &str = "seinsight.log";

/// `RUST_LOG` if set, otherwise the configured directive
fn build_filter(level: &str) -> SeinsightResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| SeinsightError::config(format!("invalid log filter {:?}: {}", level, e))),
    }
}

/// Install the global subscriber
pub fn init_logging(config: &LoggingConfig) -> SeinsightResult<Option<WorkerGuard>> {
    let filter = build_filter(&config.level)?;

    let console = if config.json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).with_target(false).boxed()
    };

    let (file_layer, guard) = match &config.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| SeinsightError::config(format!("logging already initialised: {}", e)))?;

    Ok(guard)
}
