//! Expectation fixtures.
//!
//! A fixture directory holds `expected_results.json` plus one `<key>.csv` per
//! record. The JSON maps each key to the outcome the application should
//! produce for that file. Records with `error_count == 0` form the valid
//! partition and all others the invalid one.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Expected outcome for one input file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expectation {
    /// Number of expected errors; zero means the file should validate
    #[serde(default)]
    pub error_count: u64,
    /// Expected number of accepted rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_count: Option<u64>,
    /// Expected total number of rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Row-level errors, in the order the application reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_errors: Option<Vec<Value>>,
    /// File-level error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_message: Option<String>,
}

impl Expectation {
    /// Expectation for a file that should validate with `rows` rows
    #[must_use]
    pub fn valid(rows: u64) -> Self {
        Self {
            success_count: Some(rows),
            total: Some(rows),
            ..Self::default()
        }
    }

    /// Expectation for a file rejected with row-level errors
    #[must_use]
    pub fn row_errors(errors: Vec<Value>) -> Self {
        Self {
            error_count: errors.len() as u64,
            expected_errors: Some(errors),
            ..Self::default()
        }
    }

    /// Expectation for a file rejected with a single message
    #[must_use]
    pub fn file_error(message: impl Into<String>) -> Self {
        Self {
            error_count: 1,
            expected_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Partition this record belongs to
    #[must_use]
    pub const fn verdict(&self) -> Verdict {
        Verdict::of(self.error_count)
    }
}

/// Which test set a record is exercised by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Expected to upload successfully
    Valid,
    /// Expected to be rejected
    Invalid,
}

impl Verdict {
    /// Both partitions, valid first
    pub const ALL: [Self; 2] = [Self::Valid, Self::Invalid];

    /// Partition for a record with `error_count` expected errors
    #[must_use]
    pub const fn of(error_count: u64) -> Self {
        if error_count == 0 {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Invalid => f.write_str("invalid"),
        }
    }
}

/// One input file paired with its expectation
#[derive(Debug, Clone, PartialEq)]
pub struct UploadCase {
    /// Fixture key (file stem)
    pub key: String,
    /// Path of the CSV file
    pub csv_path: PathBuf,
    /// Expected outcome
    pub expectation: Expectation,
}

impl UploadCase {
    /// File name used in logs and reports
    #[must_use]
    pub fn file_name(&self) -> String {
        self.csv_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{}.csv", self.key))
    }

    /// Partition of this case
    #[must_use]
    pub const fn verdict(&self) -> Verdict {
        self.expectation.verdict()
    }
}

/// Every expectation of a fixture directory, keyed by file stem
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectationSet {
    data_dir: PathBuf,
    records: BTreeMap<String, Expectation>,
}

impl ExpectationSet {
    /// Name of the expectations file inside the data directory
    pub const FILE_NAME: &'static str = "expected_results.json";

    /// Read `expected_results.json` from `data_dir`
    pub fn load(data_dir: impl Into<PathBuf>) -> ProbeResult<Self> {
        let data_dir = data_dir.into();
        let path = data_dir.join(Self::FILE_NAME);
        let json = fs::read_to_string(&path).map_err(|e| {
            ProbeError::fixture(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(data_dir, &json)
    }

    /// Parse expectations from JSON text; CSV paths resolve against `data_dir`
    pub fn from_json(data_dir: impl Into<PathBuf>, json: &str) -> ProbeResult<Self> {
        let records: BTreeMap<String, Expectation> = serde_json::from_str(json)
            .map_err(|e| ProbeError::fixture(format!("invalid {}: {e}", Self::FILE_NAME)))?;
        Ok(Self::from_records(data_dir, records))
    }

    /// Build a set from in-memory records
    #[must_use]
    pub fn from_records(
        data_dir: impl Into<PathBuf>,
        records: impl IntoIterator<Item = (String, Expectation)>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            records: records.into_iter().collect(),
        }
    }

    /// Directory holding the fixture
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the fixture has no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up the record for a key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Expectation> {
        self.records.get(key)
    }

    /// Path of the CSV file for a key
    #[must_use]
    pub fn csv_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.csv"))
    }

    /// Case for a key, if the fixture has a record for it
    #[must_use]
    pub fn case(&self, key: &str) -> Option<UploadCase> {
        self.records.get(key).map(|expectation| UploadCase {
            key: key.to_string(),
            csv_path: self.csv_path(key),
            expectation: expectation.clone(),
        })
    }

    /// Cases of one partition, in key order
    #[must_use]
    pub fn cases(&self, verdict: Verdict) -> Vec<UploadCase> {
        self.records
            .iter()
            .filter(|(_, e)| e.verdict() == verdict)
            .filter_map(|(key, _)| self.case(key))
            .collect()
    }

    /// Compare the records with the CSV files actually on disk
    pub fn audit(&self) -> ProbeResult<FixtureAudit> {
        let mut on_disk = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                on_disk.push(stem.to_string());
            }
        }
        on_disk.sort();

        let unmatched_files = on_disk
            .iter()
            .filter(|stem| !self.records.contains_key(stem.as_str()))
            .map(|stem| format!("{stem}.csv"))
            .collect();
        let missing_files = self
            .records
            .keys()
            .filter(|key| on_disk.binary_search(key).is_err())
            .map(|key| format!("{key}.csv"))
            .collect();

        Ok(FixtureAudit {
            unmatched_files,
            missing_files,
        })
    }
}

/// Disagreements between a fixture's records and its directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixtureAudit {
    /// CSV files with no expectation record
    pub unmatched_files: Vec<String>,
    /// Records whose CSV file does not exist
    pub missing_files: Vec<String>,
}

impl FixtureAudit {
    /// Whether every file has a record and every record a file
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unmatched_files.is_empty() && self.missing_files.is_empty()
    }
}
