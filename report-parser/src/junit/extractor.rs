use serde::{Deserialize, Serialize};

use crate::{
    document::{Element, ParsedDocument},
    extract::{parse_attr, ExtractionError},
    options::ParseOptions,
    outcome::{TestOutcome, TestStatus},
};

pub(crate) const TAG_TEST_SUITE: &str = "testsuite";
const TAG_TEST_CASE: &str = "testcase";
const TAG_TEST_CASE_STATUS_FAILURE: &str = "failure";
const TAG_TEST_CASE_STATUS_ERROR: &str = "error";
const TAG_TEST_CASE_STATUS_SKIPPED: &str = "skipped";
const TAG_SYSTEM_OUT: &str = "system-out";
const TAG_SYSTEM_ERR: &str = "system-err";

/// Counters summed over the attributes every `testsuite` declares about itself.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JunitTotals {
    pub tests: usize,
    pub failures: usize,
    pub errors: usize,
    pub skipped: usize,
    pub time_seconds: f64,
}

impl JunitTotals {
    fn add_test_suite(&mut self, test_suite: &Element) {
        let count = |attr_name| parse_attr::count(test_suite, attr_name);
        self.tests = self.tests.saturating_add(count("tests"));
        self.failures = self.failures.saturating_add(count("failures"));
        self.errors = self.errors.saturating_add(count("errors"));
        self.skipped = self.skipped.saturating_add(count("skipped"));
        self.time_seconds += parse_attr::seconds(test_suite, "time");
    }

    pub fn non_passing(&self) -> usize {
        self.failures
            .saturating_add(self.errors)
            .saturating_add(self.skipped)
    }

    /// Passed tests as implied by the declared counters, not by the test cases themselves.
    /// Negative when the suites declare more non-passing tests than tests.
    pub fn passed(&self) -> i64 {
        signed(self.tests) - signed(self.non_passing())
    }
}

fn signed(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct JunitExtraction {
    pub totals: JunitTotals,
    pub test_suite_count: usize,
    pub outcomes: Vec<TestOutcome>,
}

/// Walks every `testsuite` at any depth, summing its declared counters and turning each
/// `testcase` into an outcome. A test case is attributed to its nearest enclosing test suite only.
pub fn extract(
    document: &ParsedDocument,
    options: &ParseOptions,
) -> Result<JunitExtraction, ExtractionError> {
    let mut extraction = JunitExtraction::default();
    visit(document.root(), None, options, &mut extraction)?;

    tracing::debug!(
        test_suites = extraction.test_suite_count,
        test_cases = extraction.outcomes.len(),
        "extracted JUnit report"
    );
    Ok(extraction)
}

fn visit(
    element: &Element,
    test_suite: Option<&Element>,
    options: &ParseOptions,
    extraction: &mut JunitExtraction,
) -> Result<(), ExtractionError> {
    if element.is(TAG_TEST_SUITE) {
        extraction.totals.add_test_suite(element);
        extraction.test_suite_count += 1;
        for child in element.elements() {
            visit(child, Some(element), options, extraction)?;
        }
    } else if element.is(TAG_TEST_CASE) {
        // test cases outside of a test suite are not part of any run
        if let Some(test_suite) = test_suite {
            extraction
                .outcomes
                .push(test_case_outcome(element, test_suite, options)?);
        }
    } else {
        for child in element.elements() {
            visit(child, test_suite, options, extraction)?;
        }
    }
    Ok(())
}

fn test_case_outcome(
    test_case: &Element,
    test_suite: &Element,
    options: &ParseOptions,
) -> Result<TestOutcome, ExtractionError> {
    let name = parse_attr::required(test_case, TAG_TEST_CASE, "name", options)?;
    let mut outcome = TestOutcome::new(name, TestStatus::Passed);
    outcome.classname = parse_attr::string(test_case, "classname", options);
    outcome.suite = parse_attr::string(test_suite, "name", options);
    outcome.duration_seconds = parse_attr::seconds(test_case, "time");

    if let Some(failure) = test_case.child(TAG_TEST_CASE_STATUS_FAILURE) {
        outcome.status = TestStatus::Failed;
        set_failure_details(&mut outcome, failure, options);
    } else if let Some(error) = test_case.child(TAG_TEST_CASE_STATUS_ERROR) {
        outcome.status = TestStatus::Error;
        set_failure_details(&mut outcome, error, options);
    } else if let Some(skipped) = test_case.child(TAG_TEST_CASE_STATUS_SKIPPED) {
        outcome.status = TestStatus::Skipped;
        outcome.failure_message = parse_attr::string(skipped, "message", options);
    }

    if options.capture_output {
        outcome.system_out = test_case
            .child(TAG_SYSTEM_OUT)
            .and_then(|system_out| options.text(system_out.text()));
        outcome.system_err = test_case
            .child(TAG_SYSTEM_ERR)
            .and_then(|system_err| options.text(system_err.text()));
    }

    Ok(outcome)
}

fn set_failure_details(outcome: &mut TestOutcome, status: &Element, options: &ParseOptions) {
    outcome.failure_message = parse_attr::string(status, "message", options);
    outcome.failure_type = parse_attr::string(status, "type", options);
    outcome.failure_stacktrace = options.text(status.text());
}
