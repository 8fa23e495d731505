//! Configuration for the branchline binary.
//!
//! Values come from the environment first; command-line flags override them.

use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::cli::Cli;

/// Resolved settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Directory holding the YAML dialogue sources
    pub src_dir: PathBuf,

    /// Directory that `convert` writes into
    pub out_dir: PathBuf,

    /// Log filter directives
    pub log_filter: String,

    /// Emit JSON logs
    pub json_logs: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("dialogues"),
            out_dir: PathBuf::from("dialogues_generated"),
            log_filter: "info".to_string(),
            json_logs: false,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self::load_from(|name| env::var(name).ok())
    }

    /// Load configuration through a variable lookup
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(src_dir) = lookup("BRANCHLINE_SRC_DIR") {
            config.src_dir = PathBuf::from(src_dir);
        }

        if let Some(out_dir) = lookup("BRANCHLINE_OUT_DIR") {
            config.out_dir = PathBuf::from(out_dir);
        }

        if let Some(log_filter) = lookup("LOG_FILTER") {
            config.log_filter = log_filter;
        }

        if let Some(json_logs) = lookup("LOG_JSON") {
            match json_logs.to_lowercase().as_str() {
                "true" | "1" => config.json_logs = true,
                "false" | "0" | "" => config.json_logs = false,
                _ => warn!("Invalid LOG_JSON value: {}", json_logs),
            }
        }

        config
    }

    /// Apply command-line overrides
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(src) = &cli.src {
            self.src_dir = src.clone();
        }
        if let Some(log_filter) = &cli.log_filter {
            self.log_filter = log_filter.clone();
        }
        if cli.json_logs {
            self.json_logs = true;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::load_from(lookup(&[]));
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_environment_overrides() {
        let config = CliConfig::load_from(lookup(&[
            ("BRANCHLINE_SRC_DIR", "content/dialogue"),
            ("BRANCHLINE_OUT_DIR", "build/timelines"),
            ("LOG_FILTER", "debug"),
            ("LOG_JSON", "TRUE"),
        ]));

        assert_eq!(
            config,
            CliConfig {
                src_dir: PathBuf::from("content/dialogue"),
                out_dir: PathBuf::from("build/timelines"),
                log_filter: "debug".to_string(),
                json_logs: true,
            }
        );
    }

    #[test]
    fn test_invalid_flag_keeps_default() {
        let config = CliConfig::load_from(lookup(&[("LOG_JSON", "sometimes")]));
        assert!(!config.json_logs);
    }

    #[test]
    fn test_flags_override_environment() {
        let cli = Cli::parse_from(["branchline", "--src", "other", "--json-logs", "validate"]);
        let config = CliConfig::load_from(lookup(&[("BRANCHLINE_SRC_DIR", "content")])).with_cli(&cli);

        assert_eq!(config.src_dir, PathBuf::from("other"));
        assert!(config.json_logs);
        assert_eq!(config.log_filter, "info");
    }
}
