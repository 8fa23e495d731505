//! Logging setup shared by the Branchline binaries.

pub mod logging;

pub use logging::{init_logging, LogExt};

/// Default filter when neither `RUST_LOG` nor a configured filter is given
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration for initializing logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringConfig {
    /// Service name attached to the startup log line
    pub service_name: String,

    /// Log filter directives, e.g. "info,branchline_dsl=debug"
    pub log_filter: String,

    /// Emit JSON lines instead of human-readable output
    pub enable_json_logging: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            service_name: "branchline".to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            enable_json_logging: false,
        }
    }
}

impl MonitoringConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.enable_json_logging = enabled;
        self
    }
}
