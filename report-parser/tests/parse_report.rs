use std::{
    fs::File,
    io::{BufReader, Write},
};

use pretty_assertions::assert_eq;
use report_parser::{
    parse_report, ParseOptions, ParseResult, ProcessingStatus, ReportFormat, ReportParser,
    TestStatus,
};

const JUNIT_REPORT: &str = r#"<testsuites><testsuite name="S" tests="2" failures="1" errors="0" skipped="0" time="1.5"><testcase name="a" classname="C" time="0.5"/><testcase name="b" classname="C" time="1.0"><failure message="boom" type="AssertionError">trace</failure></testcase></testsuite></testsuites>"#;

#[test]
fn unsupported_root_fails() {
    let result = parse_report("<foo/>");
    assert_eq!(result.status(), ProcessingStatus::Failed);
    assert_eq!(result.error_message(), Some("Unsupported XML format"));
    assert_eq!(result.summary(), None);
    assert!(result.outcomes().is_empty());
}

#[test]
fn testsuites_without_testsuite_is_unsupported() {
    let result = parse_report("<testsuites/>");
    assert_eq!(result.error_message(), Some("Unsupported XML format"));
}

#[test]
fn malformed_xml_fails() {
    for xml in [
        "<testsuite name=\"x\"><testcase name=\"a\"></testsuite>",
        "<testsuite",
        "<testsuite name=\"x\">",
        "",
        "<testsuite/><testsuite/>",
    ] {
        let result = parse_report(xml);
        assert_eq!(result.status(), ProcessingStatus::Failed, "{xml:?}");
        let message = result.error_message().unwrap_or_default();
        assert!(message.starts_with("Malformed XML: "), "{xml:?}: {message}");
    }
}

#[test]
fn deeply_nested_input_fails_instead_of_overflowing() {
    for depth in [10_000, 50_000] {
        let xml = format!(
            "<testsuites>{}{}</testsuites>",
            "<a>".repeat(depth),
            "</a>".repeat(depth)
        );
        let result = parse_report(xml);
        assert_eq!(result.status(), ProcessingStatus::Failed, "depth {depth}");
        let message = result.error_message().unwrap_or_default();
        assert!(message.starts_with("Malformed XML: "), "depth {depth}: {message}");
    }
}

#[test]
fn moderately_nested_report_parses() {
    let xml = format!(
        r#"<testsuites>{}<testsuite name="deep" tests="1"><testcase name="t"/></testsuite>{}</testsuites>"#,
        "<group>".repeat(100),
        "</group>".repeat(100)
    );
    let result = parse_report(xml);
    assert_eq!(result.status(), ProcessingStatus::Completed);
    assert_eq!(result.outcomes()[0].suite.as_deref(), Some("deep"));
}

#[test]
fn keeps_whitespace_between_stacktrace_text_and_cdata() {
    let result = parse_report(
        "<testsuite name=\"s\" tests=\"1\" failures=\"1\"><testcase name=\"t\"><failure>\n  AssertionError: boom\n  <![CDATA[at A.a(A.java:1)]]>\n</failure></testcase></testsuite>",
    );
    assert_eq!(
        result.outcomes()[0].failure_stacktrace.as_deref(),
        Some("AssertionError: boom\n  at A.a(A.java:1)")
    );
}

#[test]
fn non_utf8_input_fails() {
    let result = parse_report(b"<testsuite name=\"\xff\xfe\"/>".as_slice());
    assert_eq!(result.status(), ProcessingStatus::Failed);
    assert!(result
        .error_message()
        .unwrap_or_default()
        .starts_with("Malformed XML: "));
}

#[test]
fn testng_wins_over_junit_markers() {
    let result = parse_report(
        r#"<root>
            <testsuite name="junit" tests="9" failures="9"/>
            <testng-results total="1" passed="1" failed="0" skipped="0"/>
        </root>"#,
    );
    let summary = result.summary().unwrap();
    assert_eq!(summary.format, ReportFormat::TestNg);
    assert_eq!(summary.total_tests, 1);
    assert_eq!(summary.failed, 0);
}

#[test]
fn parsing_is_deterministic_apart_from_timestamp() {
    let first = parse_report(JUNIT_REPORT);
    let second = parse_report(JUNIT_REPORT);

    let (Some(first_summary), Some(second_summary)) = (first.summary(), second.summary()) else {
        panic!("expected both parses to complete");
    };
    let mut second_summary = second_summary.clone();
    second_summary.parsed_at = first_summary.parsed_at;

    assert_eq!(first_summary, &second_summary);
    assert_eq!(first.outcomes(), second.outcomes());
}

#[test]
fn result_serializes_with_status_tag() {
    let result = serde_json::to_value(parse_report(JUNIT_REPORT)).unwrap();

    assert_eq!(result["status"], "completed");
    assert_eq!(result["summary"]["format"], "JUnit");
    assert_eq!(result["summary"]["total_tests"], 2);
    assert_eq!(result["summary"]["passed"], 1);
    assert_eq!(result["outcomes"][1]["status"], "failed");
    assert_eq!(result["outcomes"][1]["failure_message"], "boom");
    assert!(result["summary"]["parsed_at"].is_string());

    let failed = serde_json::to_value(parse_report("<foo/>")).unwrap();
    assert_eq!(
        failed,
        serde_json::json!({
            "status": "failed",
            "error_message": "Unsupported XML format",
        })
    );
}

#[test]
fn result_round_trips_through_json() {
    let result = parse_report(JUNIT_REPORT);
    let json = serde_json::to_string(&result).unwrap();
    let deserialized: ParseResult = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized, result);
}

#[test]
fn parses_from_reader() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(JUNIT_REPORT.as_bytes()).unwrap();

    let reader = BufReader::new(File::open(file.path()).unwrap());
    let result = ReportParser::default().parse_reader(reader);

    assert_eq!(result.status(), ProcessingStatus::Completed);
    assert_eq!(result.outcomes().len(), 2);
    assert_eq!(result.outcomes()[1].status, TestStatus::Failed);
}

#[test]
fn parse_run_matches_parse() {
    let parser = ReportParser::default();
    let result = parser.parse_run("run-1", JUNIT_REPORT);
    assert_eq!(result.outcomes(), parse_report(JUNIT_REPORT).outcomes());
}

#[test]
fn truncates_long_text_fields() {
    let message = "é".repeat(10);
    let xml = format!(
        r#"<testsuite name="s" tests="1" failures="1"><testcase name="t"><failure message="{message}">{message}</failure><system-out>out</system-out></testcase></testsuite>"#
    );
    let parser = ReportParser::new(ParseOptions {
        max_text_field_len: 5,
        capture_output: false,
    });

    let result = parser.parse(xml);
    let outcome = &result.outcomes()[0];
    // "é" is two bytes, so five bytes keeps two characters
    assert_eq!(outcome.failure_message.as_deref(), Some("éé"));
    assert_eq!(outcome.failure_stacktrace.as_deref(), Some("éé"));
    assert_eq!(outcome.system_out, None);
}

#[test]
fn keeps_text_fields_under_default_limit() {
    let stacktrace = "x".repeat(8_000);
    let xml = format!(
        r#"<testsuite name="s" tests="1" errors="1"><testcase name="t"><error>{stacktrace}y</error></testcase></testsuite>"#
    );
    let result = parse_report(xml);
    assert_eq!(
        result.outcomes()[0].failure_stacktrace.as_deref(),
        Some(stacktrace.as_str())
    );
}
