//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Emit to the console and to a durable log file
//! - Respect RUST_LOG when set, the configured level otherwise
//!
//! # Design Decisions
//! - The file sink is non-blocking; the returned guard must live as long
//!   as the process so buffered records are flushed on exit
//! - A missing/unwritable log file degrades to console-only, not a crash

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Initialize logging. Returns the file writer guard, if a file sink is
/// active; hold it for the life of the process.
pub fn init(config: &ObservabilityConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "cors_gateway={level},tower_http={level}",
            level = config.log_level
        ))
    });

    let (file_layer, guard, file_error) = if config.log_file.is_empty() {
        (None, None, None)
    } else {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
        {
            Ok(file) => {
                let (writer, guard) = tracing_appender::non_blocking(file);
                let layer = fmt::layer().with_writer(writer).with_ansi(false);
                (Some(layer), Some(guard), None)
            }
            Err(e) => (None, None, Some(e)),
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!(
            log_file = %config.log_file,
            error = %e,
            "Could not open log file, continuing with console only"
        );
    }

    guard
}
