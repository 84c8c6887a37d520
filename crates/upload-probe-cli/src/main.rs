//! Upload Probe CLI
//!
//! ## Usage
//!
//! ```bash
//! upload-probe run                          # Both partitions against localhost:8000
//! upload-probe run -p invalid --base-url http://app:8000
//! upload-probe audit --data-dir data        # Fixture records vs. CSV files
//! upload-probe list -p valid
//! ```

use clap::Parser;
use std::process::ExitCode;
use upload_probe::LogFormat;
use upload_probe_cli::{handlers, Cli, CliConfig, CliResult, Commands, Verbosity};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    config.init_logging();

    match cli.command {
        Commands::Run(ref args) => handlers::run_suite(&config, args),
        Commands::Audit(ref args) => handlers::run_audit(&config, args),
        Commands::List(ref args) => handlers::run_list(&config, args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let log_format = match cli.command {
        Commands::Run(ref args) if args.json_logs => LogFormat::Json,
        _ => LogFormat::Plain,
    };

    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
        .with_log_format(log_format)
}
