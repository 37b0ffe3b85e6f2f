use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    #[default]
    Passed,
    Failed,
    Error,
    Skipped,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Error => "error",
            TestStatus::Skipped => "skipped",
        })
    }
}

/// The result of a single test case or test method.
///
/// Failure diagnostics are only populated for failed, errored and (message only) skipped tests.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestOutcome {
    pub name: String,
    pub classname: Option<String>,
    /// Name of the enclosing JUnit `testsuite` or TestNG `test`.
    pub suite: Option<String>,
    pub status: TestStatus,
    pub duration_seconds: f64,
    pub failure_message: Option<String>,
    pub failure_type: Option<String>,
    pub failure_stacktrace: Option<String>,
    pub system_out: Option<String>,
    pub system_err: Option<String>,
}

impl TestOutcome {
    pub fn new<T: Into<String>>(name: T, status: TestStatus) -> Self {
        Self {
            name: name.into(),
            status,
            ..Default::default()
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, TestStatus::Failed | TestStatus::Error)
    }
}

/// Per-status tally of a list of outcomes.
///
/// `passed` is signed: a JUnit report that declares more failures, errors and skips than tests
/// yields a negative count so that `total == passed + failed + errors + skipped` still holds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: usize,
    pub passed: i64,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
}

impl<'a> FromIterator<&'a TestOutcome> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = &'a TestOutcome>>(outcomes: I) -> Self {
        outcomes
            .into_iter()
            .fold(StatusCounts::default(), |mut counts, outcome| {
                counts.total += 1;
                match outcome.status {
                    TestStatus::Passed => counts.passed += 1,
                    TestStatus::Failed => counts.failed += 1,
                    TestStatus::Error => counts.errors += 1,
                    TestStatus::Skipped => counts.skipped += 1,
                }
                counts
            })
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} passed={} failed={} errors={} skipped={}",
            self.total, self.passed, self.failed, self.errors, self.skipped
        )
    }
}
