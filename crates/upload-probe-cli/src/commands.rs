//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use upload_probe::{ProbeConfig, Verdict};

/// Upload Probe: browser checks of a CSV upload page against an expectations fixture
#[derive(Parser, Debug)]
#[command(name = "upload-probe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (failures and summary only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload every fixture file and verify the responses
    Run(RunArgs),

    /// Compare fixture records with the CSV files on disk
    Audit(AuditArgs),

    /// List the cases of a partition
    List(ListArgs),
}

/// Which fixture records to use
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartitionArg {
    /// Records with `error_count == 0`
    Valid,
    /// Records with errors
    Invalid,
    /// Both, valid first
    #[default]
    All,
}

impl PartitionArg {
    /// Partitions selected by this argument, in run order
    #[must_use]
    pub fn verdicts(self) -> Vec<Verdict> {
        match self {
            Self::Valid => vec![Verdict::Valid],
            Self::Invalid => vec![Verdict::Invalid],
            Self::All => Verdict::ALL.to_vec(),
        }
    }
}

/// Fixture location shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct FixtureArgs {
    /// Directory holding expected_results.json and the CSV files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Partition to run
    #[arg(short, long, value_enum, default_value = "all")]
    pub partition: PartitionArg,

    /// Fixture location
    #[command(flatten)]
    pub fixture: FixtureArgs,

    /// Base URL of the application under test
    #[arg(long)]
    pub base_url: Option<String>,

    /// Element wait timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Cases run at once, each in its own browser
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Launch Chromium without its sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Chromium binary to launch
    #[arg(long)]
    pub chromium_path: Option<PathBuf>,

    /// Emit log lines as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Print the suite report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Apply explicit flags on top of `config`
    #[must_use]
    pub fn apply(&self, mut config: ProbeConfig) -> ProbeConfig {
        if let Some(ref dir) = self.fixture.data_dir {
            config.data_dir.clone_from(dir);
        }
        if let Some(ref url) = self.base_url {
            config.base_url.clone_from(url);
        }
        if let Some(ms) = self.timeout_ms {
            config.element_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = self.concurrency {
            config = config.with_concurrency(n);
        }
        if self.headful {
            config.browser.headless = false;
        }
        if self.no_sandbox {
            config.browser.sandbox = false;
        }
        if let Some(ref path) = self.chromium_path {
            config.browser.chromium_path = Some(path.clone());
        }
        config
    }
}

/// Arguments for the audit command
#[derive(Args, Debug, Clone, Default)]
pub struct AuditArgs {
    /// Fixture location
    #[command(flatten)]
    pub fixture: FixtureArgs,

    /// Print the audit as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the list command
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Partition to list
    #[arg(short, long, value_enum, default_value = "all")]
    pub partition: PartitionArg,

    /// Fixture location
    #[command(flatten)]
    pub fixture: FixtureArgs,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_run_defaults() {
            let cli = Cli::try_parse_from(["upload-probe", "run"]).unwrap();
            match cli.command {
                Commands::Run(args) => {
                    assert_eq!(args.partition, PartitionArg::All);
                    assert!(args.base_url.is_none());
                    assert!(!args.headful);
                }
                other => panic!("expected run, got {other:?}"),
            }
        }

        #[test]
        fn test_parse_run_flags() {
            let cli = Cli::try_parse_from([
                "upload-probe",
                "-vv",
                "run",
                "--partition",
                "invalid",
                "--base-url",
                "http://app:8000",
                "--timeout-ms",
                "500",
                "-j",
                "3",
                "--no-sandbox",
            ])
            .unwrap();
            assert_eq!(cli.verbose, 2);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.partition, PartitionArg::Invalid);
            assert_eq!(args.timeout_ms, Some(500));
            assert_eq!(args.concurrency, Some(3));
            assert!(args.no_sandbox);
        }

        #[test]
        fn test_requires_subcommand() {
            assert!(Cli::try_parse_from(["upload-probe"]).is_err());
        }

        #[test]
        fn test_rejects_unknown_partition() {
            assert!(Cli::try_parse_from(["upload-probe", "list", "--partition", "maybe"]).is_err());
        }
    }

    mod run_args_tests {
        use super::*;

        #[test]
        fn test_apply_overrides_only_given_flags() {
            let args = RunArgs {
                base_url: Some("http://app:8000".to_string()),
                timeout_ms: Some(1000),
                headful: true,
                ..RunArgs::default()
            };
            let config = args.apply(ProbeConfig::new().with_concurrency(4));
            assert_eq!(config.base_url, "http://app:8000");
            assert_eq!(config.element_timeout, Duration::from_secs(1));
            assert_eq!(config.concurrency, 4);
            assert!(!config.browser.headless);
            assert!(config.browser.sandbox);
        }

        #[test]
        fn test_apply_clamps_concurrency() {
            let args = RunArgs {
                concurrency: Some(0),
                ..RunArgs::default()
            };
            assert_eq!(args.apply(ProbeConfig::new()).concurrency, 1);
        }

        #[test]
        fn test_partition_verdicts() {
            assert_eq!(PartitionArg::All.verdicts(), vec![Verdict::Valid, Verdict::Invalid]);
            assert_eq!(PartitionArg::Invalid.verdicts(), vec![Verdict::Invalid]);
        }
    }
}
