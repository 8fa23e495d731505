use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Validate and convert branching dialogue sources
#[derive(Parser, Debug)]
#[command(name = "branchline", version, about)]
pub struct Cli {
    /// Directory containing the YAML dialogue sources
    #[arg(long, global = true, value_name = "DIR")]
    pub src: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "info,branchline_dsl=trace"
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Check every dialogue and report diagnostics
    Validate,

    /// Generate timelines and character resources
    Convert {
        /// Output directory
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Print a preview instead of writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Rewrite a dialogue file in canonical form
    Format {
        /// File to rewrite in place
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let cli = Cli::parse_from(["branchline", "convert", "--out", "build", "--dry-run"]);
        assert_eq!(
            cli.command,
            Command::Convert {
                out: Some(PathBuf::from("build")),
                dry_run: true,
            }
        );
        assert_eq!(cli.src, None);
    }
}
