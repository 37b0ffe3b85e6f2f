use pretty_assertions::assert_eq;
use report_mock::{Options, ReportMock};
use report_parser::{
    validator::{
        self, ReportValidationIssueSubOptimal, TestOutcomeValidationIssue,
        TestOutcomeValidationIssueInvalid, TestOutcomeValidationIssueSubOptimal, ValidationIssue,
        ValidationLevel, ValidationType, MAX_FIELD_LEN,
    },
    ParsedReport, ReportParser, StatusCounts,
};

fn try_parse<T: AsRef<[u8]>>(xml: T) -> ParsedReport {
    ReportParser::default().try_parse(xml.as_ref()).unwrap()
}

fn generate_mock_junit_report(
    test_suite_count: usize,
    test_case_count: usize,
) -> (u64, ReportMock, quick_junit::Report) {
    let mut options = Options::default();
    options.junit.junit_test_suite_count = test_suite_count;
    options.junit.junit_test_case_count = test_case_count;
    let mut mock = ReportMock::new(options);
    let mut reports = mock.generate_junit_reports();
    let report = reports.pop().unwrap();
    (mock.get_seed(), mock, report)
}

#[test]
fn validate_mock_report_is_valid() {
    let (seed, mock, report) = generate_mock_junit_report(2, 5);
    let parsed = try_parse(mock.junit_to_string(&report).unwrap());

    let report_validation = validator::validate(&parsed.summary, &parsed.outcomes);

    assert_eq!(
        report_validation.max_level(),
        ValidationLevel::Valid,
        "failed to validate with seed `{}`: {:?}",
        seed,
        report_validation.all_issues_flat(),
    );
    assert_eq!(report_validation.test_outcomes().len(), 10);
}

#[test]
fn validate_test_name_too_short() {
    let (seed, mock, mut report) = generate_mock_junit_report(1, 1);
    for test_suite in &mut report.test_suites {
        for test_case in &mut test_suite.test_cases {
            test_case.name = String::new().into();
        }
    }
    let parsed = try_parse(mock.junit_to_string(&report).unwrap());

    let report_validation = validator::validate(&parsed.summary, &parsed.outcomes);

    assert_eq!(
        report_validation.max_level(),
        ValidationLevel::Invalid,
        "failed to validate with seed `{}`",
        seed,
    );
    assert_eq!(
        report_validation
            .test_outcomes()
            .iter()
            .flat_map(|test_outcome| Vec::from(test_outcome.issues()))
            .collect::<Vec<TestOutcomeValidationIssue>>(),
        vec![ValidationIssue::Invalid(
            TestOutcomeValidationIssueInvalid::TestNameTooShort(String::new()),
        )],
        "failed to validate with seed `{}`",
        seed,
    );
    assert_eq!(report_validation.num_invalid_issues(), 1);
}

#[test]
fn validate_test_name_too_long() {
    let (seed, mock, mut report) = generate_mock_junit_report(1, 1);
    for test_suite in &mut report.test_suites {
        for test_case in &mut test_suite.test_cases {
            test_case.name = "a".repeat(MAX_FIELD_LEN + 1).into();
        }
    }
    let parsed = try_parse(mock.junit_to_string(&report).unwrap());

    let report_validation = validator::validate(&parsed.summary, &parsed.outcomes);

    assert_eq!(
        report_validation.max_level(),
        ValidationLevel::SubOptimal,
        "failed to validate with seed `{}`",
        seed,
    );
    assert_eq!(
        report_validation
            .test_outcomes()
            .iter()
            .flat_map(|test_outcome| Vec::from(test_outcome.issues()))
            .collect::<Vec<TestOutcomeValidationIssue>>(),
        vec![ValidationIssue::SubOptimal(
            TestOutcomeValidationIssueSubOptimal::TestNameTooLong("a".repeat(MAX_FIELD_LEN)),
        )],
        "failed to validate with seed `{}`",
        seed,
    );
}

#[test]
fn validate_missing_classname() {
    let parsed = try_parse(r#"<testsuite name="s" tests="1"><testcase name="t"/></testsuite>"#);

    let report_validation = validator::validate(&parsed.summary, &parsed.outcomes);

    assert_eq!(report_validation.level(), ValidationLevel::Valid);
    assert_eq!(report_validation.max_level(), ValidationLevel::SubOptimal);
    assert_eq!(
        Vec::from(report_validation.test_outcomes()[0].issues()),
        vec![ValidationIssue::SubOptimal(
            TestOutcomeValidationIssueSubOptimal::TestClassnameTooShort(String::new()),
        )]
    );
}

#[test]
fn validate_declared_counts_mismatch() {
    let parsed = try_parse(
        r#"<testsuite name="s" tests="10" failures="2" errors="1" skipped="3"><testcase name="only" classname="C"/></testsuite>"#,
    );

    let report_validation = validator::validate(&parsed.summary, &parsed.outcomes);

    assert_eq!(report_validation.level(), ValidationLevel::SubOptimal);
    assert_eq!(
        Vec::from(report_validation.issues()),
        vec![ValidationIssue::SubOptimal(
            ReportValidationIssueSubOptimal::DeclaredCountsMismatch {
                declared: StatusCounts {
                    total: 10,
                    passed: 4,
                    failed: 2,
                    errors: 1,
                    skipped: 3,
                },
                observed: StatusCounts {
                    total: 1,
                    passed: 1,
                    ..Default::default()
                },
            }
        )]
    );
}

#[test]
fn validate_declared_counts_exceed_total() {
    let parsed = try_parse(
        r#"<testsuite name="s" tests="1" failures="1" skipped="1"><testcase name="t" classname="C"><failure/></testcase></testsuite>"#,
    );

    let report_validation = validator::validate(&parsed.summary, &parsed.outcomes);

    assert!(report_validation.issues().contains(&ValidationIssue::SubOptimal(
        ReportValidationIssueSubOptimal::DeclaredCountsExceedTotal {
            tests: 1,
            non_passing: 2,
        }
    )));
}

#[test]
fn validate_empty_report() {
    let parsed = try_parse(r#"<testng-results total="0"/>"#);

    let report_validation = validator::validate(&parsed.summary, &parsed.outcomes);

    assert_eq!(
        report_validation.all_issues_flat(),
        vec![validator::FlatValidationIssue {
            level: ValidationLevel::SubOptimal,
            issue_type: ValidationType::Report,
            message: String::from("report declares no tests"),
        }]
    );
}

#[test]
fn invalid_issues_sort_first() {
    let parsed = try_parse(
        r#"<testsuite name="s" tests="3"><testcase name="b"/><testcase name=" " classname="C"/><testcase name="a"/></testsuite>"#,
    );

    let report_validation = validator::validate(&parsed.summary, &parsed.outcomes);
    let levels: Vec<ValidationLevel> = report_validation
        .all_issues_flat()
        .into_iter()
        .map(|issue| issue.level)
        .collect();

    assert_eq!(
        levels,
        [
            ValidationLevel::Invalid,
            ValidationLevel::SubOptimal,
            ValidationLevel::SubOptimal,
        ]
    );
    assert_eq!(report_validation.num_suboptimal_issues(), 2);
}
