//! Suite harness: runs fixture cases through the workflow and reports per file.
//!
//! [`UploadSuite::run_case`] is the test boundary. Whatever goes wrong inside a
//! case (launch, navigation, timeouts, decoding, mismatches) is logged with the
//! file name and turned into a failed [`CaseReport`] carrying the error text.

use crate::assertion::{verify_invalid, verify_valid, InvalidCheck};
use crate::driver::BrowserLauncher;
use crate::fixture::{ExpectationSet, UploadCase, Verdict};
use crate::result::ProbeResult;
use crate::workflow::UploadWorkflow;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Outcome of a single case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum CaseOutcome {
    /// Response matched the fixture
    Passed {
        /// What was verified
        detail: String,
    },
    /// Something went wrong
    Failed {
        /// Error text as raised
        error: String,
    },
}

/// Result of running one input file
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    /// CSV file name
    pub file_name: String,
    /// Partition the case belongs to
    pub verdict: Verdict,
    /// Pass/fail with detail
    pub outcome: CaseOutcome,
    /// Wall time of the case
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

impl CaseReport {
    /// Whether the case passed
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self.outcome, CaseOutcome::Passed { .. })
    }

    /// Error text of a failed case
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            CaseOutcome::Failed { error } => Some(error),
            CaseOutcome::Passed { .. } => None,
        }
    }

    /// One `test <file> ... ok|FAILED` line, as the test runner prints it
    #[must_use]
    pub fn trial_line(&self) -> String {
        let status = if self.passed() { "ok" } else { "FAILED" };
        format!("test {} ... {status}", self.file_name)
    }

    /// Panic with the error text if the case failed
    ///
    /// # Panics
    ///
    /// Panics when the case failed.
    pub fn assert_passed(&self) {
        if let Some(error) = self.error() {
            panic!("Unexpected error for {}: {error}", self.file_name);
        }
    }
}

impl fmt::Display for CaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            CaseOutcome::Passed { detail } => write!(
                f,
                "PASS {} ({}ms): {detail}",
                self.file_name,
                self.duration.as_millis()
            ),
            CaseOutcome::Failed { error } => write!(
                f,
                "FAIL {} ({}ms): {error}",
                self.file_name,
                self.duration.as_millis()
            ),
        }
    }
}

/// Reports of every case in a run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Per-file reports in fixture order
    pub cases: Vec<CaseReport>,
}

impl Default for SuiteReport {
    fn default() -> Self {
        Self::new()
    }
}

impl SuiteReport {
    /// Empty report starting now
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            cases: Vec::new(),
        }
    }

    /// Number of passed cases
    #[must_use]
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    /// Failed cases
    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| !c.passed())
    }

    /// Whether every case passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Closing `test result:` line with pass/fail counts
    #[must_use]
    pub fn summary(&self) -> String {
        let status = if self.all_passed() { "ok" } else { "FAILED" };
        format!(
            "test result: {status}. {} passed; {} failed",
            self.passed(),
            self.cases.len() - self.passed()
        )
    }

    /// Add the cases of another report
    pub fn merge(&mut self, other: Self) {
        self.cases.extend(other.cases);
    }

    /// Panic listing every failing file
    ///
    /// # Panics
    ///
    /// Panics when any case failed.
    pub fn assert_all_passed(&self) {
        let failures: Vec<String> = self.failures().map(ToString::to_string).collect();
        assert!(
            failures.is_empty(),
            "{} of {} uploads failed:\n{}",
            failures.len(),
            self.cases.len(),
            failures.join("\n")
        );
    }
}

/// Couples a workflow with the shared, read-only fixture
#[derive(Debug, Clone)]
pub struct UploadSuite<L> {
    workflow: UploadWorkflow<L>,
    fixtures: Arc<ExpectationSet>,
    concurrency: usize,
}

impl<L: BrowserLauncher> UploadSuite<L> {
    /// Create a suite
    #[must_use]
    pub fn new(workflow: UploadWorkflow<L>, fixtures: Arc<ExpectationSet>) -> Self {
        Self {
            workflow,
            fixtures,
            concurrency: 1,
        }
    }

    /// Run up to `n` cases at once
    #[must_use]
    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    /// The shared fixture
    #[must_use]
    pub fn fixtures(&self) -> &ExpectationSet {
        &self.fixtures
    }

    /// The workflow runner
    #[must_use]
    pub const fn workflow(&self) -> &UploadWorkflow<L> {
        &self.workflow
    }

    /// Run one case and verify it against its partition's rules
    pub async fn run_case(&self, case: &UploadCase) -> CaseReport {
        let file_name = case.file_name();
        let verdict = case.verdict();
        info!(file = %file_name, %verdict, "testing file");

        let start = Instant::now();
        let outcome = match self.check(case).await {
            Ok(detail) => {
                info!(file = %file_name, "{detail}");
                CaseOutcome::Passed { detail }
            }
            Err(e) => {
                error!(file = %file_name, error = %e, "unexpected error");
                CaseOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        CaseReport {
            file_name,
            verdict,
            outcome,
            duration: start.elapsed(),
        }
    }

    async fn check(&self, case: &UploadCase) -> ProbeResult<String> {
        let result = self.workflow.run(&case.csv_path).await?;
        match case.verdict() {
            Verdict::Valid => {
                let check = verify_valid(&result, &case.expectation)?;
                Ok(format!("passed with {} records", check.rows))
            }
            Verdict::Invalid => match verify_invalid(&result, &case.expectation)? {
                InvalidCheck::RowErrors(n) => Ok(format!("correctly failed with {n} row errors")),
                InvalidCheck::Message => Ok("correctly failed with expected message".to_string()),
                InvalidCheck::MessageUnchecked(message) => {
                    warn!(
                        file = %case.file_name(),
                        %message,
                        "fixture has no expected_message; message content not checked"
                    );
                    Ok(format!("correctly failed with unchecked message {message:?}"))
                }
            },
        }
    }

    /// Run every case of a partition
    pub async fn run_partition(&self, verdict: Verdict) -> SuiteReport {
        self.run_cases(self.fixtures.cases(verdict)).await
    }

    /// Run both partitions, valid first
    pub async fn run_all(&self) -> SuiteReport {
        let mut report = self.run_partition(Verdict::Valid).await;
        report.merge(self.run_partition(Verdict::Invalid).await);
        report
    }

    /// Run the given cases, keeping their order in the report
    pub async fn run_cases(&self, cases: Vec<UploadCase>) -> SuiteReport {
        self.run_cases_with(cases, |_| {}).await
    }

    /// Run the given cases, calling `on_case` as each report is ready
    pub async fn run_cases_with(
        &self,
        cases: Vec<UploadCase>,
        mut on_case: impl FnMut(&CaseReport),
    ) -> SuiteReport {
        let started_at = Utc::now();
        let cases = stream::iter(cases.iter())
            .map(|case| self.run_case(case))
            .buffered(self.concurrency)
            .inspect(|report| on_case(report))
            .collect::<Vec<_>>()
            .await;
        SuiteReport { started_at, cases }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(file_name: &str, outcome: CaseOutcome) -> CaseReport {
        CaseReport {
            file_name: file_name.to_string(),
            verdict: Verdict::Valid,
            outcome,
            duration: Duration::from_millis(12),
        }
    }

    fn pass(file_name: &str) -> CaseReport {
        report(
            file_name,
            CaseOutcome::Passed {
                detail: "passed with 1 records".to_string(),
            },
        )
    }

    fn fail(file_name: &str) -> CaseReport {
        report(
            file_name,
            CaseOutcome::Failed {
                error: "Timed out after 30000ms waiting for #results".to_string(),
            },
        )
    }

    mod case_report_tests {
        use super::*;

        #[test]
        fn test_display() {
            assert_eq!(pass("a.csv").to_string(), "PASS a.csv (12ms): passed with 1 records");
            assert_eq!(
                fail("b.csv").to_string(),
                "FAIL b.csv (12ms): Timed out after 30000ms waiting for #results"
            );
        }

        #[test]
        fn test_assert_passed_on_pass() {
            pass("a.csv").assert_passed();
        }

        #[test]
        #[should_panic(expected = "Unexpected error for b.csv: Timed out")]
        fn test_assert_passed_on_failure() {
            fail("b.csv").assert_passed();
        }

        #[test]
        fn test_serializes_outcome_tag() {
            let json = serde_json::to_value(fail("b.csv")).unwrap();
            assert_eq!(json["outcome"]["result"], "failed");
            assert_eq!(json["duration"], 12);
            assert_eq!(json["verdict"], "valid");
        }

        #[test]
        fn test_trial_line_per_file() {
            assert_eq!(pass("a.csv").trial_line(), "test a.csv ... ok");
            assert_eq!(fail("b.csv").trial_line(), "test b.csv ... FAILED");
        }

        #[test]
        fn test_duration_saturates_when_serialized() {
            let mut case = pass("a.csv");
            case.duration = Duration::MAX;
            let json = serde_json::to_value(case).unwrap();
            assert_eq!(json["duration"], u64::MAX);
        }
    }

    mod suite_report_tests {
        use super::*;

        #[test]
        fn test_counts() {
            let report = SuiteReport {
                started_at: Utc::now(),
                cases: vec![pass("a.csv"), fail("b.csv"), pass("c.csv")],
            };
            assert_eq!(report.passed(), 2);
            assert!(!report.all_passed());
            let failed: Vec<_> = report.failures().map(|c| c.file_name.as_str()).collect();
            assert_eq!(failed, vec!["b.csv"]);
        }

        #[test]
        #[should_panic(expected = "2 of 3 uploads failed")]
        fn test_assert_all_passed_lists_every_failure() {
            let report = SuiteReport {
                started_at: Utc::now(),
                cases: vec![fail("a.csv"), pass("b.csv"), fail("c.csv")],
            };
            report.assert_all_passed();
        }

        #[test]
        fn test_summary() {
            let mut report = SuiteReport {
                started_at: Utc::now(),
                cases: vec![pass("a.csv"), pass("b.csv")],
            };
            assert_eq!(report.summary(), "test result: ok. 2 passed; 0 failed");
            report.cases.push(fail("c.csv"));
            assert_eq!(report.summary(), "test result: FAILED. 2 passed; 1 failed");
        }

        #[test]
        fn test_merge() {
            let mut report = SuiteReport {
                started_at: Utc::now(),
                cases: vec![pass("a.csv")],
            };
            report.merge(SuiteReport {
                started_at: Utc::now(),
                cases: vec![pass("b.csv")],
            });
            assert_eq!(report.cases.len(), 2);
            report.assert_all_passed();
        }
    }

    mod suite_tests {
        use super::*;
        use crate::driver::{MockDriver, MockLauncher};
        use crate::fixture::Expectation;
        use crate::page_object::UploadPage;

        fn suite(result: &str) -> UploadSuite<MockLauncher> {
            let page = MockDriver::new()
                .with_element("input[type='file']", "")
                .with_element("button[type='submit']", "Upload")
                .reveal_on_click("button[type='submit']", "#results", result);
            let fixtures = ExpectationSet::from_records(
                "data",
                [
                    ("a".to_string(), Expectation::file_error("bad header")),
                    ("b".to_string(), Expectation::file_error("bad header")),
                    ("c".to_string(), Expectation::valid(2)),
                ],
            );
            UploadSuite::new(
                UploadWorkflow::new(
                    MockLauncher::new(page),
                    UploadPage::new("http://localhost:8000")
                        .with_element_timeout(Duration::from_millis(10)),
                ),
                Arc::new(fixtures),
            )
        }

        #[tokio::test]
        async fn test_run_partition_in_key_order() {
            let suite = suite(r#"{"status":"error","message":"bad header"}"#).with_concurrency(2);
            let mut seen = 0;
            let report = suite
                .run_cases_with(suite.fixtures().cases(Verdict::Invalid), |_| seen += 1)
                .await;
            assert_eq!(seen, 2);
            let files: Vec<_> = report.cases.iter().map(|c| c.file_name.as_str()).collect();
            assert_eq!(files, vec!["a.csv", "b.csv"]);
            report.assert_all_passed();
        }

        #[tokio::test]
        async fn test_run_all_reports_every_case() {
            let suite = suite(r#"{"status":"error","message":"bad header"}"#);
            let report = suite.run_all().await;
            assert_eq!(report.cases.len(), 3);
            assert_eq!(report.passed(), 2);
            assert_eq!(report.cases[0].verdict, Verdict::Valid);
            assert_eq!(
                report.cases[0].error(),
                Some("status mismatch: expected success, got error")
            );
        }

        #[tokio::test]
        async fn test_message_without_expectation_passes() {
            let suite = suite(r#"{"status":"error","message":"whatever"}"#);
            let case = UploadCase {
                key: "d".to_string(),
                csv_path: "data/d.csv".into(),
                expectation: Expectation {
                    error_count: 1,
                    ..Expectation::default()
                },
            };
            let report = suite.run_case(&case).await;
            assert!(report.passed());
        }
    }
}
