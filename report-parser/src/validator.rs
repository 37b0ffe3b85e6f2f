use std::{cmp::Ordering, fmt};

use serde::Serialize;
use thiserror::Error;

use crate::{
    detector::ReportFormat,
    outcome::{StatusCounts, TestOutcome},
    string_safety::FieldLen,
    summary::RunSummary,
};

pub const MAX_FIELD_LEN: usize = 1_000;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum ValidationLevel {
    #[default]
    Valid = 0,
    SubOptimal = 1,
    Invalid = 2,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidationIssue<SO, I> {
    SubOptimal(SO),
    Invalid(I),
}

impl<SO, I> From<&ValidationIssue<SO, I>> for ValidationLevel {
    fn from(value: &ValidationIssue<SO, I>) -> Self {
        match value {
            ValidationIssue::SubOptimal(..) => ValidationLevel::SubOptimal,
            ValidationIssue::Invalid(..) => ValidationLevel::Invalid,
        }
    }
}

impl<SO: fmt::Display, I: fmt::Display> fmt::Display for ValidationIssue<SO, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::SubOptimal(i) => write!(f, "{}", i),
            ValidationIssue::Invalid(i) => write!(f, "{}", i),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum ValidationType {
    #[default]
    Report = 0,
    TestOutcome = 1,
}

pub type ReportValidationIssue =
    ValidationIssue<ReportValidationIssueSubOptimal, ReportValidationIssueInvalid>;

#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReportValidationIssueSubOptimal {
    #[error("report declares {declared} but its test outcomes add up to {observed}")]
    DeclaredCountsMismatch {
        declared: StatusCounts,
        observed: StatusCounts,
    },
    #[error("report declares {non_passing} failed, errored or skipped tests but only {tests} tests")]
    DeclaredCountsExceedTotal { tests: usize, non_passing: usize },
    #[error("report declares no tests")]
    NoTests,
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReportValidationIssueInvalid {}

pub type TestOutcomeValidationIssue =
    ValidationIssue<TestOutcomeValidationIssueSubOptimal, TestOutcomeValidationIssueInvalid>;

#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TestOutcomeValidationIssueSubOptimal {
    #[error("test name too long, truncated to {}", MAX_FIELD_LEN)]
    TestNameTooLong(String),
    #[error("test classname too short")]
    TestClassnameTooShort(String),
    #[error("test classname too long, truncated to {}", MAX_FIELD_LEN)]
    TestClassnameTooLong(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TestOutcomeValidationIssueInvalid {
    #[error("test name too short")]
    TestNameTooShort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssueType {
    Report(ReportValidationIssue),
    TestOutcome(TestOutcomeValidationIssue),
}

impl fmt::Display for ValidationIssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssueType::Report(i) => write!(f, "{}", i),
            ValidationIssueType::TestOutcome(i) => write!(f, "{}", i),
        }
    }
}

impl From<&ValidationIssueType> for ValidationLevel {
    fn from(value: &ValidationIssueType) -> Self {
        match value {
            ValidationIssueType::Report(i) => ValidationLevel::from(i),
            ValidationIssueType::TestOutcome(i) => ValidationLevel::from(i),
        }
    }
}

impl From<&ValidationIssueType> for ValidationType {
    fn from(value: &ValidationIssueType) -> Self {
        match value {
            ValidationIssueType::Report(..) => ValidationType::Report,
            ValidationIssueType::TestOutcome(..) => ValidationType::TestOutcome,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlatValidationIssue {
    pub level: ValidationLevel,
    pub issue_type: ValidationType,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestOutcomeValidation {
    name: String,
    level: ValidationLevel,
    issues: Vec<TestOutcomeValidationIssue>,
}

impl TestOutcomeValidation {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> ValidationLevel {
        self.level
    }

    pub fn issues(&self) -> &[TestOutcomeValidationIssue] {
        &self.issues
    }

    fn add_issue(&mut self, issue: TestOutcomeValidationIssue) {
        self.level = self.level.max(ValidationLevel::from(&issue));
        self.issues.push(issue);
    }
}

/// Quality report for a parsed run. Validation never changes the parse result itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportValidation {
    level: ValidationLevel,
    issues: Vec<ReportValidationIssue>,
    test_outcomes: Vec<TestOutcomeValidation>,
}

impl ReportValidation {
    pub fn level(&self) -> ValidationLevel {
        self.level
    }

    pub fn issues(&self) -> &[ReportValidationIssue] {
        &self.issues
    }

    pub fn test_outcomes(&self) -> &[TestOutcomeValidation] {
        &self.test_outcomes
    }

    pub fn max_level(&self) -> ValidationLevel {
        self.test_outcomes
            .iter()
            .map(|test_outcome| test_outcome.level)
            .max()
            .map_or(self.level, |l| l.max(self.level))
    }

    /// All issues, invalid ones first, then ordered by message.
    pub fn all_issues(&self) -> Vec<ValidationIssueType> {
        let mut all_issues: Vec<ValidationIssueType> = self
            .issues
            .iter()
            .cloned()
            .map(ValidationIssueType::Report)
            .chain(
                self.test_outcomes
                    .iter()
                    .flat_map(|test_outcome| test_outcome.issues.iter().cloned())
                    .map(ValidationIssueType::TestOutcome),
            )
            .collect();

        all_issues.sort_by(
            |a, b| match (ValidationLevel::from(a), ValidationLevel::from(b)) {
                (ValidationLevel::Invalid, ValidationLevel::SubOptimal) => Ordering::Less,
                (ValidationLevel::SubOptimal, ValidationLevel::Invalid) => Ordering::Greater,
                _ => a.to_string().cmp(&b.to_string()),
            },
        );
        all_issues
    }

    pub fn all_issues_flat(&self) -> Vec<FlatValidationIssue> {
        self.all_issues()
            .iter()
            .map(|i| FlatValidationIssue {
                level: ValidationLevel::from(i),
                issue_type: ValidationType::from(i),
                message: i.to_string(),
            })
            .collect()
    }

    pub fn num_invalid_issues(&self) -> usize {
        self.count_issues_at(ValidationLevel::Invalid)
    }

    pub fn num_suboptimal_issues(&self) -> usize {
        self.count_issues_at(ValidationLevel::SubOptimal)
    }

    fn count_issues_at(&self, level: ValidationLevel) -> usize {
        self.all_issues()
            .iter()
            .filter(|issue| ValidationLevel::from(*issue) == level)
            .count()
    }

    fn add_issue(&mut self, issue: ReportValidationIssue) {
        self.level = self.level.max(ValidationLevel::from(&issue));
        self.issues.push(issue);
    }
}

pub fn validate(summary: &RunSummary, outcomes: &[TestOutcome]) -> ReportValidation {
    let mut report_validation = ReportValidation::default();

    if summary.total_tests == 0 {
        report_validation.add_issue(ValidationIssue::SubOptimal(
            ReportValidationIssueSubOptimal::NoTests,
        ));
    }

    let non_passing = summary
        .failed
        .saturating_add(summary.errors)
        .saturating_add(summary.skipped);
    if summary.format == ReportFormat::JUnit && non_passing > summary.total_tests {
        report_validation.add_issue(ValidationIssue::SubOptimal(
            ReportValidationIssueSubOptimal::DeclaredCountsExceedTotal {
                tests: summary.total_tests,
                non_passing,
            },
        ));
    }

    let declared = summary.counts();
    let observed: StatusCounts = outcomes.iter().collect();
    if declared != observed {
        tracing::debug!(%declared, %observed, "declared counts disagree with test outcomes");
        report_validation.add_issue(ValidationIssue::SubOptimal(
            ReportValidationIssueSubOptimal::DeclaredCountsMismatch { declared, observed },
        ));
    }

    for outcome in outcomes {
        let mut test_outcome_validation = TestOutcomeValidation {
            name: outcome.name.clone(),
            ..Default::default()
        };

        match FieldLen::check(&outcome.name, MAX_FIELD_LEN) {
            FieldLen::Valid => (),
            FieldLen::Empty => {
                test_outcome_validation.add_issue(ValidationIssue::Invalid(
                    TestOutcomeValidationIssueInvalid::TestNameTooShort(String::new()),
                ));
            }
            FieldLen::TooLong(s) => {
                test_outcome_validation.add_issue(ValidationIssue::SubOptimal(
                    TestOutcomeValidationIssueSubOptimal::TestNameTooLong(s.to_string()),
                ));
            }
        };

        match FieldLen::check(
            outcome.classname.as_deref().unwrap_or_default(),
            MAX_FIELD_LEN,
        ) {
            FieldLen::Valid => (),
            FieldLen::Empty => {
                test_outcome_validation.add_issue(ValidationIssue::SubOptimal(
                    TestOutcomeValidationIssueSubOptimal::TestClassnameTooShort(String::new()),
                ));
            }
            FieldLen::TooLong(s) => {
                test_outcome_validation.add_issue(ValidationIssue::SubOptimal(
                    TestOutcomeValidationIssueSubOptimal::TestClassnameTooLong(s.to_string()),
                ));
            }
        };

        report_validation.test_outcomes.push(test_outcome_validation);
    }

    report_validation
}
