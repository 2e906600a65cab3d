//! Logging utilities for the Agendify application.
//!
//! This module provides a standardized approach to logging across all crates
//! in the workspace. It includes functions for initializing the tracing
//! subscriber from the `[logging]` configuration section.

use agendify_config::LoggingConfig;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix of the rolling log files.
const LOG_FILE_PREFIX: &str = "agendify.log";

/// Initialize logging from the `[logging]` configuration section.
///
/// When `directory` is set, a daily rolling file layer is added next to stdout.
/// The returned guard flushes the file writer on drop and must be held by `main`.
pub fn init_with_config(config: Option<&LoggingConfig>) -> Option<WorkerGuard> {
    let level = config
        .and_then(|c| c.level.clone())
        .unwrap_or_else(|| "info".to_string());
    let directory = config.and_then(|c| c.directory.clone());

    match directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(&directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let result = tracing_subscriber::registry()
                .with(stdout_layer())
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .with(filter_for(&level))
                .try_init();
            if result.is_ok() {
                info!("Logging initialized at level: {} (files in {})", level, directory);
            }
            Some(guard)
        }
        None => {
            let result = tracing_subscriber::registry()
                .with(stdout_layer())
                .with(filter_for(&level))
                .try_init();
            if result.is_ok() {
                info!("Logging initialized at level: {}", level);
            }
            None
        }
    }
}

fn stdout_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("agendify={level},agendify_booking={level},agendify_store={level},agendify_backend={level},tower_http=info"))
    })
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result so it can be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => tracing::error!("{}: {}", error_context, e),
    }
    result
}
