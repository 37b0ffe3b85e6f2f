//! Parsing and normalization of JUnit and TestNG XML test reports.
//!
//! Raw XML goes through four stages: [`document`] builds a tree, [`detector`] classifies the
//! format, the [`junit`] or [`testng`] extractor collects outcomes and declared counters, and
//! [`summary`] reduces them to a [`summary::RunSummary`]. [`parser::parse_report`] runs the whole
//! pipeline and always returns a [`parser::ParseResult`].

pub mod detector;
pub mod document;
pub mod extract;
pub mod junit;
pub mod options;
pub mod outcome;
pub mod parser;
pub mod string_safety;
pub mod summary;
pub mod testng;
pub mod validator;

pub use detector::ReportFormat;
pub use options::ParseOptions;
pub use outcome::{StatusCounts, TestOutcome, TestStatus};
pub use parser::{
    parse_report, ParseResult, ParsedReport, ProcessingStatus, ReportParseError, ReportParser,
};
pub use summary::RunSummary;
