//! Upload Probe CLI Library
//!
//! Command-line front end for the upload-probe suite.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    AuditArgs, Cli, ColorArg, Commands, FixtureArgs, ListArgs, PartitionArg, RunArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
