use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use branchline_cli::commands;
use branchline_cli::{Cli, CliConfig, Command};
use branchline_monitoring::{init_logging, LogExt, MonitoringConfig};

fn run(cli: &Cli, config: &CliConfig) -> anyhow::Result<bool> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let success = match &cli.command {
        Command::Validate => commands::validate(&config.src_dir, &mut out)
            .log_err("validate")?
            .is_success(),
        Command::Convert { out: out_dir, dry_run } => {
            let out_dir = out_dir.as_deref().unwrap_or(&config.out_dir);
            commands::convert(&config.src_dir, out_dir, *dry_run, &mut out)
                .log_err("convert")?
                .is_success()
        }
        Command::Format { file } => {
            commands::format(file, &mut out).log_err("format")?;
            true
        }
    };

    out.flush()?;
    Ok(success)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CliConfig::load().with_cli(&cli);

    let monitoring = MonitoringConfig::new("branchline")
        .with_log_filter(config.log_filter.clone())
        .with_json_logging(config.json_logs);
    if let Err(e) = init_logging(&monitoring) {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    match run(&cli, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
