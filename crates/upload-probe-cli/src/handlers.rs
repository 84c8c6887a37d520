//! Subcommand handlers

use crate::commands::{AuditArgs, FixtureArgs, ListArgs, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use upload_probe::{
    ChromiumLauncher, Expectation, ExpectationSet, ProbeConfig, SuiteReport, UploadSuite,
    UploadWorkflow,
};

/// Environment configuration with the fixture directory flag applied
fn base_config(fixture: &FixtureArgs) -> CliResult<ProbeConfig> {
    let mut config = ProbeConfig::new().from_env()?;
    if let Some(ref dir) = fixture.data_dir {
        config.data_dir.clone_from(dir);
    }
    Ok(config)
}

/// Upload every selected fixture file and verify the responses
pub fn run_suite(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let probe = args.apply(ProbeConfig::new().from_env()?);
    debug!(?probe, "resolved configuration");

    let fixtures = Arc::new(ExpectationSet::load(probe.data_dir.clone())?);
    let launcher =
        ChromiumLauncher::new(probe.browser.clone()).with_poll_interval(probe.poll_interval);
    let suite = UploadSuite::new(UploadWorkflow::new(launcher, probe.page()), fixtures)
        .with_concurrency(probe.concurrency);

    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    reporter.info(&format!("Testing {} ({})", probe.base_url, probe.data_dir.display()));

    let runtime = tokio::runtime::Runtime::new()?;
    let start = Instant::now();
    let mut report = SuiteReport::new();

    for verdict in args.partition.verdicts() {
        let cases = suite.fixtures().cases(verdict);
        reporter.header(&format!("{verdict} uploads ({} files)", cases.len()));
        if cases.is_empty() {
            reporter.warning(&format!("no {verdict} records in the fixture"));
            continue;
        }

        reporter.start_progress(cases.len() as u64, &verdict.to_string());
        let partition = runtime.block_on(suite.run_cases_with(cases, |case| reporter.case(case)));
        reporter.finish();
        report.merge(partition);
    }

    let failed = report.failures().count();
    reporter.summary(report.passed(), failed, start.elapsed());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if failed > 0 {
        return Err(CliError::TestFailures {
            failed,
            total: report.cases.len(),
        });
    }
    Ok(())
}

/// Compare fixture records with the CSV files on disk
pub fn run_audit(config: &CliConfig, args: &AuditArgs) -> CliResult<()> {
    let probe = base_config(&args.fixture)?;
    let fixtures = ExpectationSet::load(probe.data_dir)?;
    let audit = fixtures.audit()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&audit)?);
    } else {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        for file in &audit.unmatched_files {
            reporter.failure(&format!("{file} has no record in {}", ExpectationSet::FILE_NAME));
        }
        for file in &audit.missing_files {
            reporter.failure(&format!("{file} is listed but does not exist"));
        }
        if audit.is_clean() {
            reporter.success(&format!(
                "{} records, every one with a CSV file",
                fixtures.len()
            ));
        }
    }

    if audit.is_clean() {
        Ok(())
    } else {
        Err(CliError::FixtureAudit {
            unmatched: audit.unmatched_files.len(),
            missing: audit.missing_files.len(),
        })
    }
}

/// Print the cases of the selected partitions, one per line
pub fn run_list(_config: &CliConfig, args: &ListArgs) -> CliResult<()> {
    let probe = base_config(&args.fixture)?;
    let fixtures = ExpectationSet::load(probe.data_dir)?;
    for verdict in args.partition.verdicts() {
        for case in fixtures.cases(verdict) {
            println!(
                "{verdict}\t{}\t{}",
                case.file_name(),
                describe(&case.expectation)
            );
        }
    }
    Ok(())
}

/// One-line summary of what a record expects
#[must_use]
pub fn describe(expectation: &Expectation) -> String {
    if let Some(ref errors) = expectation.expected_errors {
        return format!("{} row errors", errors.len());
    }
    if let Some(ref message) = expectation.expected_message {
        return format!("message {message:?}");
    }
    match (expectation.success_count, expectation.total) {
        (Some(rows), _) | (None, Some(rows)) => format!("{rows} rows"),
        (None, None) if expectation.error_count > 0 => {
            format!("{} errors", expectation.error_count)
        }
        (None, None) => "no counts".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe() {
        assert_eq!(describe(&Expectation::valid(10)), "10 rows");
        assert_eq!(
            describe(&Expectation::row_errors(vec![json!({"row": 1}), json!({"row": 2})])),
            "2 row errors"
        );
        assert_eq!(
            describe(&Expectation::file_error("Empty file")),
            r#"message "Empty file""#
        );
        let bare = Expectation {
            error_count: 3,
            ..Expectation::default()
        };
        assert_eq!(describe(&bare), "3 errors");
        assert_eq!(describe(&Expectation::default()), "no counts");
    }
}
