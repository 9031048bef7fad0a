//! Test case execution with deadlines and failure artifacts.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::driver::Driver;
use crate::reporter::{Reporter, TestResultEntry};
use crate::result::{ComprarError, ComprarResult};

/// Default per-test deadline (90 seconds, the checkout flow's worst case)
pub const DEFAULT_CASE_TIMEOUT_MS: u64 = 90_000;

/// A single test case
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Test name
    pub name: String,
    /// Test-level deadline in milliseconds
    pub timeout_ms: u64,
}

impl TestCase {
    /// Create a new test case
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timeout_ms: DEFAULT_CASE_TIMEOUT_MS,
        }
    }

    /// Set the deadline
    #[must_use]
    pub const fn with_timeout(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }
}

/// Result of running a single test
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test name
    pub name: String,
    /// Whether the test passed
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Test duration
    pub duration: Duration,
}

impl TestResult {
    /// Whether the test passed
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        self.passed
    }
}

/// Run one test case against its driver, enforcing the deadline.
///
/// A deadline expiry aborts the in-flight operation and fails the test; no
/// partial-state cleanup happens beyond session teardown. On any failure a
/// screenshot is captured and attached to the report entry.
pub async fn run_case<D, Fut>(
    case: &TestCase,
    driver: &D,
    reporter: &mut Reporter,
    fut: Fut,
) -> TestResult
where
    D: Driver,
    Fut: Future<Output = ComprarResult<()>>,
{
    let start = Instant::now();
    let outcome = match tokio::time::timeout(Duration::from_millis(case.timeout_ms), fut).await {
        Ok(result) => result,
        Err(_) => Err(ComprarError::Timeout {
            ms: case.timeout_ms,
            waiting_for: format!("test '{}' to finish", case.name),
        }),
    };
    let duration = start.elapsed();

    match outcome {
        Ok(()) => {
            reporter.record(TestResultEntry::passed(&case.name, duration));
            TestResult {
                name: case.name.clone(),
                passed: true,
                error: None,
                duration,
            }
        }
        Err(err) => {
            let message = err.to_string();
            tracing::error!(test = case.name, error = %message, "test failed");
            let mut entry = TestResultEntry::failed(&case.name, duration, &message);
            match driver.screenshot().await {
                Ok(bytes) if !bytes.is_empty() => match reporter.save_screenshot(&case.name, &bytes)
                {
                    Ok(path) => entry = entry.with_screenshot(path),
                    Err(save_err) => {
                        tracing::warn!(error = %save_err, "failed to persist failure screenshot");
                    }
                },
                Ok(_) => {}
                Err(shot_err) => {
                    tracing::warn!(error = %shot_err, "failed to capture failure screenshot");
                }
            }
            reporter.record(entry);
            TestResult {
                name: case.name.clone(),
                passed: false,
                error: Some(message),
                duration,
            }
        }
    }
}
