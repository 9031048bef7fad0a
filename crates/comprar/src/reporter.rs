//! Suite reporting and failure artifacts.
//!
//! Mirrors the runner conventions the suite is used with: screenshots only
//! on failure, a plain-text summary, and a JSON report for tooling.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::result::ComprarResult;

/// Status of a finished test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    /// Test passed
    Passed,
    /// Test failed
    Failed,
    /// Test was skipped
    Skipped,
}

/// One test's report entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResultEntry {
    /// Test name
    pub name: String,
    /// Outcome
    pub status: TestStatus,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Error message for failures
    pub error: Option<String>,
    /// Failure screenshot path, if one was captured
    pub screenshot: Option<PathBuf>,
    /// When the test finished
    pub finished_at: chrono::DateTime<chrono::Utc>,
}

impl TestResultEntry {
    /// Entry for a passed test
    #[must_use]
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Passed,
            duration_ms: duration.as_millis() as u64,
            error: None,
            screenshot: None,
            finished_at: chrono::Utc::now(),
        }
    }

    /// Entry for a failed test
    #[must_use]
    pub fn failed(name: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Failed,
            duration_ms: duration.as_millis() as u64,
            error: Some(error.into()),
            screenshot: None,
            finished_at: chrono::Utc::now(),
        }
    }

    /// Entry for a skipped test
    #[must_use]
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Skipped,
            duration_ms: 0,
            error: None,
            screenshot: None,
            finished_at: chrono::Utc::now(),
        }
    }

    /// Attach a failure screenshot path
    #[must_use]
    pub fn with_screenshot(mut self, path: PathBuf) -> Self {
        self.screenshot = Some(path);
        self
    }
}

/// Collects results and failure artifacts for one suite run.
#[derive(Debug)]
pub struct Reporter {
    name: String,
    results: Vec<TestResultEntry>,
    artifacts_dir: PathBuf,
}

impl Reporter {
    /// Create a reporter writing artifacts under `test-results/`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: Vec::new(),
            artifacts_dir: PathBuf::from("test-results"),
        }
    }

    /// Override the artifacts directory
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    /// Record a finished test
    pub fn record(&mut self, entry: TestResultEntry) {
        self.results.push(entry);
    }

    /// Persist a failure screenshot and return its path.
    pub fn save_screenshot(&self, test_name: &str, png: &[u8]) -> ComprarResult<PathBuf> {
        fs::create_dir_all(&self.artifacts_dir)?;
        let slug: String = test_name
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect();
        let path = self
            .artifacts_dir
            .join(format!("{slug}-{}.png", uuid::Uuid::new_v4()));
        fs::write(&path, png)?;
        Ok(path)
    }

    /// Number of passed tests
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == TestStatus::Passed)
            .count()
    }

    /// Number of failed tests
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == TestStatus::Failed)
            .count()
    }

    /// Whether every recorded test passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// All recorded entries
    #[must_use]
    pub fn results(&self) -> &[TestResultEntry] {
        &self.results
    }

    /// Failed entries
    #[must_use]
    pub fn failures(&self) -> Vec<&TestResultEntry> {
        self.results
            .iter()
            .filter(|r| r.status == TestStatus::Failed)
            .collect()
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {} passed, {} failed, {} total",
            self.name,
            self.passed_count(),
            self.failed_count(),
            self.results.len()
        )
    }

    /// Write the JSON report
    pub fn write_json(&self, path: &Path) -> ComprarResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let report = serde_json::json!({
            "suite": self.name,
            "results": self.results,
        });
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_summary() {
        let mut reporter = Reporter::new("woocommerce");
        reporter.record(TestResultEntry::passed("checkout", Duration::from_secs(42)));
        reporter.record(TestResultEntry::failed(
            "orders",
            Duration::from_secs(3),
            "element not found",
        ));
        reporter.record(TestResultEntry::skipped("wishlist"));

        assert_eq!(reporter.passed_count(), 1);
        assert_eq!(reporter.failed_count(), 1);
        assert!(!reporter.all_passed());
        assert_eq!(reporter.failures().len(), 1);
        assert!(reporter.summary().contains("1 passed, 1 failed, 3 total"));
    }

    #[test]
    fn test_save_screenshot_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Reporter::new("suite").with_artifacts_dir(dir.path());
        let path = reporter
            .save_screenshot("checkout flow / step 3", &[1, 2, 3])
            .unwrap();
        assert!(path.exists());
        assert!(path.extension().is_some_and(|e| e == "png"));
    }

    #[test]
    fn test_write_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut reporter = Reporter::new("suite").with_artifacts_dir(dir.path());
        reporter.record(TestResultEntry::passed("login", Duration::from_secs(5)));

        let path = dir.path().join("report").join("results.json");
        reporter.write_json(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["suite"], "suite");
        assert_eq!(json["results"][0]["name"], "login");
    }
}
