//! The `branchline` command-line tool.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Command};
pub use config::CliConfig;
