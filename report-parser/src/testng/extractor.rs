use serde::{Deserialize, Serialize};

use crate::{
    document::{Element, ParsedDocument},
    extract::{parse_attr, ExtractionError},
    options::ParseOptions,
    outcome::{TestOutcome, TestStatus},
};

pub(crate) const TAG_RESULTS: &str = "testng-results";
const TAG_SUITE: &str = "suite";
const TAG_TEST: &str = "test";
const TAG_CLASS: &str = "class";
const TAG_TEST_METHOD: &str = "test-method";
const TAG_EXCEPTION: &str = "exception";
const TAG_EXCEPTION_MESSAGE: &str = "message";
const TAG_FULL_STACKTRACE: &str = "full-stacktrace";

const STATUS_PASS: &str = "PASS";
const STATUS_FAIL: &str = "FAIL";
const STATUS_SKIP: &str = "SKIP";

/// Counters declared on the `testng-results` element. These are trusted as-is.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestNgTotals {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TestNgExtraction {
    pub totals: TestNgTotals,
    /// `test-method` elements left out because they are setup/teardown methods.
    pub config_method_count: usize,
    pub outcomes: Vec<TestOutcome>,
}

pub fn extract(
    document: &ParsedDocument,
    options: &ParseOptions,
) -> Result<TestNgExtraction, ExtractionError> {
    let results = document
        .root()
        .find_first(TAG_RESULTS)
        .ok_or(ExtractionError::ElementNotFound(TAG_RESULTS))?;

    let mut extraction = TestNgExtraction {
        totals: TestNgTotals {
            total: parse_attr::count(results, "total"),
            passed: parse_attr::count(results, "passed"),
            failed: parse_attr::count(results, "failed"),
            skipped: parse_attr::count(results, "skipped"),
            duration_seconds: 0.0,
        },
        ..Default::default()
    };

    let mut declared_duration: Option<f64> = None;
    for suite in results.children_named(TAG_SUITE) {
        if suite.attr("duration-ms").is_some() {
            *declared_duration.get_or_insert(0.0) +=
                parse_attr::millis_as_seconds(suite, "duration-ms");
        }
        for test in suite.children_named(TAG_TEST) {
            let test_name = parse_attr::string(test, "name", options);
            for class in test.children_named(TAG_CLASS) {
                let classname = parse_attr::string(class, "name", options);
                for test_method in class.children_named(TAG_TEST_METHOD) {
                    if parse_attr::flag(test_method, "is-config") {
                        extraction.config_method_count += 1;
                        continue;
                    }
                    let mut outcome = test_method_outcome(test_method, options)?;
                    outcome.classname = classname.clone();
                    outcome.suite = test_name.clone();
                    extraction.outcomes.push(outcome);
                }
            }
        }
    }

    extraction.totals.duration_seconds = declared_duration.unwrap_or_else(|| {
        extraction
            .outcomes
            .iter()
            .map(|outcome| outcome.duration_seconds)
            .sum()
    });

    tracing::debug!(
        test_methods = extraction.outcomes.len(),
        config_methods = extraction.config_method_count,
        "extracted TestNG report"
    );
    Ok(extraction)
}

fn test_method_outcome(
    test_method: &Element,
    options: &ParseOptions,
) -> Result<TestOutcome, ExtractionError> {
    let name = parse_attr::required(test_method, TAG_TEST_METHOD, "name", options)?;
    let status = status_from_attr(test_method, &name);
    let mut outcome = TestOutcome::new(name, status);
    outcome.duration_seconds = parse_attr::millis_as_seconds(test_method, "duration-ms");

    if status == TestStatus::Failed {
        if let Some(exception) = test_method.child(TAG_EXCEPTION) {
            outcome.failure_type = parse_attr::string(exception, "class", options);
            outcome.failure_message =
                parse_attr::string(exception, "message", options).or_else(|| {
                    exception
                        .child(TAG_EXCEPTION_MESSAGE)
                        .and_then(|message| options.text(message.text()))
                });
            outcome.failure_stacktrace = exception
                .find_first(TAG_FULL_STACKTRACE)
                .and_then(|stacktrace| options.text(stacktrace.text()));
        }
    }

    Ok(outcome)
}

/// TestNG has no separate error status; anything that is not a known status counts as passed.
fn status_from_attr(test_method: &Element, name: &str) -> TestStatus {
    match test_method.attr("status").map(str::trim) {
        Some(STATUS_PASS) => TestStatus::Passed,
        Some(STATUS_FAIL) => TestStatus::Failed,
        Some(STATUS_SKIP) => TestStatus::Skipped,
        status => {
            tracing::warn!(
                test_method = name,
                status = status.unwrap_or_default(),
                "unknown TestNG status, treating test method as passed"
            );
            TestStatus::Passed
        }
    }
}
