use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    document::ParsedDocument, junit::extractor::TAG_TEST_SUITE, testng::extractor::TAG_RESULTS,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportFormat {
    #[serde(rename = "JUnit")]
    JUnit,
    #[serde(rename = "TestNG")]
    TestNg,
    Unsupported,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportFormat::JUnit => "JUnit",
            ReportFormat::TestNg => "TestNG",
            ReportFormat::Unsupported => "Unsupported",
        })
    }
}

/// Classifies a document by its structural markers. A `testng-results` element anywhere in the
/// tree wins over `testsuite` elements.
pub fn detect(document: &ParsedDocument) -> ReportFormat {
    let format = if document.contains_named(TAG_RESULTS) {
        ReportFormat::TestNg
    } else if document.contains_named(TAG_TEST_SUITE) {
        ReportFormat::JUnit
    } else {
        ReportFormat::Unsupported
    };
    tracing::debug!(root = %document.root().name, %format, "detected report format");
    format
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect_str(xml: &str) -> ReportFormat {
        detect(&ParsedDocument::parse_bytes(xml).unwrap())
    }

    #[test]
    fn detects_junit_with_and_without_wrapper() {
        assert_eq!(detect_str("<testsuite name=\"a\"/>"), ReportFormat::JUnit);
        assert_eq!(
            detect_str("<testsuites><testsuite name=\"a\"/></testsuites>"),
            ReportFormat::JUnit
        );
        assert_eq!(
            detect_str("<report><nested><testsuite/></nested></report>"),
            ReportFormat::JUnit
        );
    }

    #[test]
    fn detects_testng_anywhere() {
        assert_eq!(detect_str("<testng-results/>"), ReportFormat::TestNg);
        assert_eq!(
            detect_str("<wrapper><testng-results total=\"0\"/></wrapper>"),
            ReportFormat::TestNg
        );
    }

    #[test]
    fn testng_wins_when_both_markers_are_present() {
        assert_eq!(
            detect_str("<testsuites><testsuite/><testng-results/></testsuites>"),
            ReportFormat::TestNg
        );
    }

    #[test]
    fn anything_else_is_unsupported() {
        assert_eq!(detect_str("<foo/>"), ReportFormat::Unsupported);
        assert_eq!(detect_str("<testsuites/>"), ReportFormat::Unsupported);
        assert_eq!(detect_str("<testcase name=\"orphan\"/>"), ReportFormat::Unsupported);
    }

    #[test]
    fn displays_format_tags() {
        assert_eq!(ReportFormat::JUnit.to_string(), "JUnit");
        assert_eq!(ReportFormat::TestNg.to_string(), "TestNG");
    }
}
