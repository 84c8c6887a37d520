//! Shared runner for the browser suites
//!
//! Both suites need a running application at `UPLOAD_PROBE_BASE_URL`
//! (default `http://localhost:8000`) and a Chromium binary. Every file of the
//! partition is reported as its own `test <file> ... ok|FAILED` line; files
//! are listed as ignored unless `UPLOAD_PROBE_E2E=1`.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use upload_probe::prelude::*;

/// Opt-in switch for tests that need a browser and a live application
pub const ENV_E2E: &str = "UPLOAD_PROBE_E2E";

pub fn e2e_enabled() -> bool {
    std::env::var(ENV_E2E).is_ok_and(|v| v == "1")
}

fn config() -> ProbeConfig {
    let defaults =
        ProbeConfig::new().with_data_dir(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"));
    defaults.from_env().expect("invalid UPLOAD_PROBE_* environment")
}

fn suite(config: &ProbeConfig, fixtures: Arc<ExpectationSet>) -> UploadSuite<ChromiumLauncher> {
    let launcher =
        ChromiumLauncher::new(config.browser.clone()).with_poll_interval(config.poll_interval);
    UploadSuite::new(UploadWorkflow::new(launcher, config.page()), fixtures)
        .with_concurrency(config.concurrency)
}

/// First non-flag argument, used like the test runner's name filter
fn name_filter() -> Option<String> {
    std::env::args().skip(1).find(|a| !a.starts_with('-'))
}

/// Upload every file of a partition, one result line per file
pub fn run_partition(verdict: Verdict) -> ExitCode {
    let config = config();
    let fixtures = Arc::new(ExpectationSet::load(config.data_dir.clone()).expect("fixture must load"));
    let filter = name_filter();
    let cases: Vec<UploadCase> = fixtures
        .cases(verdict)
        .into_iter()
        .filter(|c| filter.as_deref().map_or(true, |f| c.file_name().contains(f)))
        .collect();

    println!("\nrunning {} tests", cases.len());
    if !e2e_enabled() {
        for case in &cases {
            println!("test {} ... ignored, requires {ENV_E2E}=1", case.file_name());
        }
        println!("\ntest result: ok. 0 passed; 0 failed; {} ignored\n", cases.len());
        return ExitCode::SUCCESS;
    }

    let _ = upload_probe::logging::init(LogFormat::Plain);
    let runtime = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    let suite = suite(&config, fixtures);
    let report =
        runtime.block_on(suite.run_cases_with(cases, |case| println!("{}", case.trial_line())));

    if !report.all_passed() {
        println!("\nfailures:\n");
        for case in report.failures() {
            println!("    {case}");
        }
    }
    println!("\n{}\n", report.summary());
    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
