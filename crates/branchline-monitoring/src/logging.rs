//! Structured logging using tracing.
//!
//! Logs always go to stderr so command output on stdout stays clean.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::MonitoringConfig;

/// Build the filter: `RUST_LOG` wins over the configured directives
fn build_filter(config: &MonitoringConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new(crate::DEFAULT_LOG_FILTER))
}

/// Initialize structured logging. Fails if a global subscriber is already set.
pub fn init_logging(config: &MonitoringConfig) -> anyhow::Result<()> {
    let json_layer = config.enable_json_logging.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
    });

    let pretty_layer = (!config.enable_json_logging).then(|| {
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
    });

    let subscriber = tracing_subscriber::registry()
        .with(build_filter(config))
        .with(json_layer)
        .with(pretty_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global default subscriber")?;

    info!(
        service_name = %config.service_name,
        log_format = if config.enable_json_logging { "json" } else { "pretty" },
        "Logging initialized"
    );

    Ok(())
}

/// Log failures of a command before they propagate to the caller
pub trait LogExt<T, E> {
    /// Log the error under `action` and hand the result back unchanged
    fn log_err(self, action: &str) -> Result<T, E>;
}

impl<T, E: std::fmt::Display> LogExt<T, E> for Result<T, E> {
    fn log_err(self, action: &str) -> Result<T, E> {
        if let Err(e) = &self {
            tracing::error!(action, error = %e, "Command failed");
        }
        self
    }
}
