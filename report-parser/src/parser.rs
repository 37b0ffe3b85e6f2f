use std::{fmt, io::BufRead};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    detector::{detect, ReportFormat},
    document::{DocumentError, ParsedDocument},
    extract::{Extraction, ExtractionError},
    junit, testng,
    options::ParseOptions,
    outcome::TestOutcome,
    summary::{aggregate, RunSummary},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportParseError {
    #[error("Malformed XML: {0}")]
    MalformedXml(#[from] DocumentError),
    #[error("Unsupported XML format")]
    UnsupportedFormat,
    #[error("Failed to extract test results: {0}")]
    Extraction(#[from] ExtractionError),
}

/// Processing state of a report as seen by the caller that stores it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Failed)
    }

    pub fn can_transition_to(&self, next: ProcessingStatus) -> bool {
        matches!(
            (self, next),
            (ProcessingStatus::Pending, ProcessingStatus::Processing)
                | (ProcessingStatus::Processing, ProcessingStatus::Completed)
                | (ProcessingStatus::Processing, ProcessingStatus::Failed)
        )
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    pub summary: RunSummary,
    pub outcomes: Vec<TestOutcome>,
}

/// Terminal result of one parse call. Every failure mode ends up as [`ParseResult::Failed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseResult {
    Completed {
        summary: RunSummary,
        outcomes: Vec<TestOutcome>,
    },
    Failed {
        error_message: String,
    },
}

impl ParseResult {
    pub fn status(&self) -> ProcessingStatus {
        match self {
            ParseResult::Completed { .. } => ProcessingStatus::Completed,
            ParseResult::Failed { .. } => ProcessingStatus::Failed,
        }
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            ParseResult::Completed { summary, .. } => Some(summary),
            ParseResult::Failed { .. } => None,
        }
    }

    pub fn outcomes(&self) -> &[TestOutcome] {
        match self {
            ParseResult::Completed { outcomes, .. } => outcomes.as_slice(),
            ParseResult::Failed { .. } => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ParseResult::Completed { .. } => None,
            ParseResult::Failed { error_message } => Some(error_message.as_str()),
        }
    }
}

impl From<Result<ParsedReport, ReportParseError>> for ParseResult {
    fn from(result: Result<ParsedReport, ReportParseError>) -> Self {
        match result {
            Ok(ParsedReport { summary, outcomes }) => ParseResult::Completed { summary, outcomes },
            Err(e) => ParseResult::Failed {
                error_message: e.to_string(),
            },
        }
    }
}

/// Parses a report with [`ParseOptions::default`].
pub fn parse_report<T: AsRef<[u8]>>(raw_report: T) -> ParseResult {
    ReportParser::default().parse(raw_report)
}

#[derive(Debug, Clone, Default)]
pub struct ReportParser {
    options: ParseOptions,
}

impl ReportParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn parse<T: AsRef<[u8]>>(&self, raw_report: T) -> ParseResult {
        self.parse_reader(raw_report.as_ref())
    }

    /// Same as [`ReportParser::parse`], with every log event tagged with the caller's run id.
    pub fn parse_run<T: AsRef<[u8]>>(&self, run_id: &str, raw_report: T) -> ParseResult {
        let span = tracing::info_span!("parse_report", run_id);
        let _enter = span.enter();
        self.parse(raw_report)
    }

    pub fn parse_reader<R: BufRead>(&self, xml: R) -> ParseResult {
        let result = self.try_parse(xml);
        match &result {
            Ok(report) => tracing::debug!(
                status = %ProcessingStatus::Completed,
                format = %report.summary.format,
                outcomes = report.outcomes.len(),
                "parsed test report"
            ),
            Err(e) => tracing::warn!(
                status = %ProcessingStatus::Failed,
                "failed to parse test report: {}",
                e
            ),
        }
        ParseResult::from(result)
    }

    pub fn try_parse<R: BufRead>(&self, xml: R) -> Result<ParsedReport, ReportParseError> {
        tracing::debug!(status = %ProcessingStatus::Processing, "parsing test report");
        let document = ParsedDocument::parse(xml)?;

        let extraction = match detect(&document) {
            ReportFormat::JUnit => {
                Extraction::JUnit(junit::extractor::extract(&document, &self.options)?)
            }
            ReportFormat::TestNg => {
                Extraction::TestNg(testng::extractor::extract(&document, &self.options)?)
            }
            ReportFormat::Unsupported => return Err(ReportParseError::UnsupportedFormat),
        };

        let (summary, outcomes) = aggregate(extraction);
        Ok(ParsedReport { summary, outcomes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_status_transitions() {
        use ProcessingStatus::*;

        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Processing));
        assert!(Completed.is_terminal() && Failed.is_terminal());
        assert!(!Pending.is_terminal() && !Processing.is_terminal());
    }

    #[test]
    fn unsupported_format_message() {
        assert_eq!(
            ReportParseError::UnsupportedFormat.to_string(),
            "Unsupported XML format"
        );
    }
}
