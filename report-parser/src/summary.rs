use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    detector::ReportFormat,
    extract::Extraction,
    junit::extractor::JunitExtraction,
    outcome::{StatusCounts, TestOutcome},
    testng::extractor::TestNgExtraction,
};

/// Aggregate statistics for one parsed report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_tests: usize,
    /// Signed because JUnit derives it by subtraction; see [`StatusCounts`].
    pub passed: i64,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    pub duration_seconds: f64,
    pub format: ReportFormat,
    pub parsed_at: DateTime<Utc>,
}

impl RunSummary {
    /// ISO-8601 rendering of [`RunSummary::parsed_at`].
    pub fn parsed_at_timestamp(&self) -> String {
        self.parsed_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts {
            total: self.total_tests,
            passed: self.passed,
            failed: self.failed,
            errors: self.errors,
            skipped: self.skipped,
        }
    }
}

/// Reduces an extraction to its summary using the reconciliation rule of its format.
///
/// JUnit derives `passed` from the declared suite counters by plain subtraction, which keeps
/// `total_tests == passed + failed + errors + skipped` even for inconsistent counters. TestNG
/// takes the counters declared on `testng-results` verbatim and never reports errors.
pub fn aggregate(extraction: Extraction) -> (RunSummary, Vec<TestOutcome>) {
    let parsed_at = Utc::now();
    let (summary, outcomes) = match extraction {
        Extraction::JUnit(JunitExtraction {
            totals, outcomes, ..
        }) => (
            RunSummary {
                total_tests: totals.tests,
                passed: totals.passed(),
                failed: totals.failures,
                errors: totals.errors,
                skipped: totals.skipped,
                duration_seconds: totals.time_seconds,
                format: ReportFormat::JUnit,
                parsed_at,
            },
            outcomes,
        ),
        Extraction::TestNg(TestNgExtraction {
            totals, outcomes, ..
        }) => (
            RunSummary {
                total_tests: totals.total,
                passed: i64::try_from(totals.passed).unwrap_or(i64::MAX),
                failed: totals.failed,
                errors: 0,
                skipped: totals.skipped,
                duration_seconds: totals.duration_seconds,
                format: ReportFormat::TestNg,
                parsed_at,
            },
            outcomes,
        ),
    };

    tracing::debug!(
        format = %summary.format,
        counts = %summary.counts(),
        outcomes = outcomes.len(),
        "aggregated run summary"
    );
    (summary, outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        junit::extractor::JunitTotals, outcome::TestStatus, testng::extractor::TestNgTotals,
    };

    #[test]
    fn junit_passed_is_derived_from_declared_counters() {
        let (summary, outcomes) = aggregate(Extraction::JUnit(JunitExtraction {
            totals: JunitTotals {
                tests: 10,
                failures: 2,
                errors: 1,
                skipped: 3,
                time_seconds: 1.5,
            },
            test_suite_count: 1,
            outcomes: vec![TestOutcome::new("only", TestStatus::Failed)],
        }));

        assert_eq!(
            summary.counts(),
            StatusCounts {
                total: 10,
                passed: 4,
                failed: 2,
                errors: 1,
                skipped: 3,
            }
        );
        assert_eq!(summary.duration_seconds, 1.5);
        assert_eq!(summary.format, ReportFormat::JUnit);
        assert_eq!(outcomes.len(), 1);
    }

    #[test]
    fn junit_passed_goes_negative_instead_of_clamping() {
        let (summary, _) = aggregate(Extraction::JUnit(JunitExtraction {
            totals: JunitTotals {
                tests: 1,
                failures: 2,
                ..Default::default()
            },
            ..Default::default()
        }));
        assert_eq!(summary.passed, -1);
        assert_eq!(
            summary.passed + (summary.failed + summary.errors + summary.skipped) as i64,
            summary.total_tests as i64
        );
    }

    #[test]
    fn testng_counters_are_taken_verbatim() {
        let (summary, _) = aggregate(Extraction::TestNg(TestNgExtraction {
            totals: TestNgTotals {
                total: 7,
                passed: 1,
                failed: 1,
                skipped: 1,
                duration_seconds: 2.0,
            },
            ..Default::default()
        }));

        assert_eq!(
            summary.counts(),
            StatusCounts {
                total: 7,
                passed: 1,
                failed: 1,
                errors: 0,
                skipped: 1,
            }
        );
        assert_eq!(summary.format, ReportFormat::TestNg);
    }

    #[test]
    fn parsed_at_renders_as_iso_8601() {
        let (summary, _) = aggregate(Extraction::JUnit(JunitExtraction::default()));
        let rendered = summary.parsed_at_timestamp();
        assert!(rendered.ends_with('Z'), "{rendered}");
        assert_eq!(
            DateTime::parse_from_rfc3339(&rendered).map(|t| t.timestamp()),
            Ok(summary.parsed_at.timestamp())
        );
    }
}
