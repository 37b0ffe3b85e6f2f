use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use clap::Parser;
use fake::Fake;
use quick_junit::{NonSuccessKind, Report, TestCase, TestCaseStatus, TestSuite};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use rand::prelude::*;
use rand::rngs::StdRng;

macro_rules! percentages_parser {
    ($func_name:ident, $num_percentages:literal) => {
        fn $func_name(argument: &str) -> std::result::Result<Vec<u8>, clap::Error> {
            argument
                .split(',')
                .enumerate()
                .try_fold((0_u8, Vec::new()), |mut acc, (i, percentage_str)| {
                    if i >= $num_percentages {
                        return Err(clap::Error::raw(
                            clap::error::ErrorKind::InvalidValue,
                            format!("More than {} percentages provided", $num_percentages),
                        ));
                    }
                    let percentage = percentage_str
                        .parse::<u8>()
                        .map_err(|e| clap::Error::raw(clap::error::ErrorKind::InvalidValue, e))?;

                    if percentage > 100 {
                        return Err(clap::Error::raw(
                            clap::error::ErrorKind::InvalidValue,
                            format!("Percentage at index {} is greater than 100", i),
                        ));
                    }

                    acc.0 += percentage;

                    if acc.0 > 100 {
                        return Err(clap::Error::raw(
                            clap::error::ErrorKind::InvalidValue,
                            "Sum of percentages are greater than 100",
                        ));
                    }

                    acc.1.push(percentage);

                    Ok(acc)
                })
                .map(|v| v.1)
        }
    };
}

#[derive(Debug, Parser, Clone)]
pub struct Options {
    #[command(flatten, next_help_heading = "Global Options")]
    pub global: GlobalOptions,

    #[command(flatten, next_help_heading = "JUnit Options")]
    pub junit: JunitOptions,

    #[command(flatten, next_help_heading = "TestNG Options")]
    pub testng: TestNgOptions,
}

impl Default for Options {
    fn default() -> Self {
        Options::try_parse_from([""]).unwrap()
    }
}

#[test]
fn options_can_be_defaulted_without_panicing() {
    Options::default();
}

#[derive(Debug, Parser, Clone)]
#[group()]
pub struct GlobalOptions {
    /// Seed for all generated data, defaults to randomly generated seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Timestamp for all data to be based on, defaults to now
    #[arg(long)]
    pub timestamp: Option<DateTime<FixedOffset>>,

    /// The number of reports to generate
    #[arg(long, default_value = "1")]
    pub report_count: usize,
}

percentages_parser!(four_percentages_parser, 4);
percentages_parser!(three_percentages_parser, 3);

#[derive(Debug, Parser, Clone)]
#[group()]
pub struct JunitOptions {
    /// The number of test suites per report
    #[arg(long, default_value = "3")]
    pub junit_test_suite_count: usize,

    /// The number of test cases per test suite
    #[arg(long, default_value = "10")]
    pub junit_test_case_count: usize,

    /// The chance of a test case succeeding, skipping, failing, and erroring (must add up to 100)
    #[arg(long, value_parser = four_percentages_parser, default_value = "25,25,25,25")]
    pub junit_success_to_skip_to_fail_to_error_percentage: Vec<Vec<u8>>,

    /// The chance of system out and system error messages being added to a test case
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100), default_value = "50")]
    pub junit_sys_out_percentage: u8,

    /// Inclusive range of test case durations
    #[arg(long, num_args = 1..=2, value_names = ["DURATION_RANGE_START", "DURATION_RANGE_END"], default_values = ["10ms", "5s"])]
    pub junit_test_case_duration_range: Vec<humantime::Duration>,

    /// Serialize the reports without the top-level `testsuites` element
    #[arg(long)]
    pub do_not_render_testsuites_element: bool,
}

#[derive(Debug, Parser, Clone)]
#[group()]
pub struct TestNgOptions {
    /// The number of suites per report
    #[arg(long, default_value = "1")]
    pub testng_suite_count: usize,

    /// The number of tests per suite
    #[arg(long, default_value = "2")]
    pub testng_test_count: usize,

    /// The number of classes per test
    #[arg(long, default_value = "2")]
    pub testng_class_count: usize,

    /// The number of test methods per class, not counting configuration methods
    #[arg(long, default_value = "5")]
    pub testng_test_method_count: usize,

    /// The chance of a test method passing, failing, and skipping (must add up to 100)
    #[arg(long, value_parser = three_percentages_parser, default_value = "60,20,20")]
    pub testng_pass_to_fail_to_skip_percentage: Vec<Vec<u8>>,

    /// The chance of a class having `@BeforeMethod`/`@AfterMethod` configuration methods
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100), default_value = "50")]
    pub testng_config_method_percentage: u8,

    /// Inclusive range of test method durations
    #[arg(long, num_args = 1..=2, value_names = ["DURATION_RANGE_START", "DURATION_RANGE_END"], default_values = ["10ms", "5s"])]
    pub testng_test_method_duration_range: Vec<humantime::Duration>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TestNgStatus {
    Pass,
    Fail,
    Skip,
}

impl TestNgStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestNgStatus::Pass => "PASS",
            TestNgStatus::Fail => "FAIL",
            TestNgStatus::Skip => "SKIP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestNgException {
    pub class: String,
    pub message: String,
    pub full_stacktrace: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestNgTestMethod {
    pub name: String,
    pub status: TestNgStatus,
    pub duration: Duration,
    pub is_config: bool,
    pub exception: Option<TestNgException>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestNgClass {
    pub name: String,
    pub test_methods: Vec<TestNgTestMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestNgTest {
    pub name: String,
    pub classes: Vec<TestNgClass>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestNgSuite {
    pub name: String,
    pub tests: Vec<TestNgTest>,
}

impl TestNgSuite {
    pub fn duration(&self) -> Duration {
        self.tests
            .iter()
            .flat_map(|test| test.classes.iter())
            .flat_map(|class| class.test_methods.iter())
            .map(|test_method| test_method.duration)
            .sum()
    }
}

/// A `testng-results.xml` document as TestNG's XML reporter writes it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestNgReport {
    pub suites: Vec<TestNgSuite>,
}

impl TestNgReport {
    pub fn test_methods(&self) -> impl Iterator<Item = &TestNgTestMethod> {
        self.suites
            .iter()
            .flat_map(|suite| suite.tests.iter())
            .flat_map(|test| test.classes.iter())
            .flat_map(|class| class.test_methods.iter())
    }

    /// Test methods that are not configuration methods.
    pub fn test_cases(&self) -> impl Iterator<Item = &TestNgTestMethod> {
        self.test_methods()
            .filter(|test_method| !test_method.is_config)
    }

    pub fn count(&self, status: TestNgStatus) -> usize {
        self.test_cases()
            .filter(|test_method| test_method.status == status)
            .count()
    }

    pub fn total(&self) -> usize {
        self.test_cases().count()
    }

    pub fn serialize<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = Writer::new_with_indent(writer, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let total = self.total().to_string();
        let passed = self.count(TestNgStatus::Pass).to_string();
        let failed = self.count(TestNgStatus::Fail).to_string();
        let skipped = self.count(TestNgStatus::Skip).to_string();
        writer.write_event(Event::Start(BytesStart::new("testng-results").with_attributes(
            [
                ("ignored", "0"),
                ("total", total.as_str()),
                ("passed", passed.as_str()),
                ("failed", failed.as_str()),
                ("skipped", skipped.as_str()),
            ],
        )))?;
        writer.write_event(Event::Empty(BytesStart::new("reporter-output")))?;

        for suite in &self.suites {
            let duration_ms = suite.duration().as_millis().to_string();
            writer.write_event(Event::Start(BytesStart::new("suite").with_attributes([
                ("name", suite.name.as_str()),
                ("duration-ms", duration_ms.as_str()),
            ])))?;
            writer.write_event(Event::Empty(BytesStart::new("groups")))?;
            for test in &suite.tests {
                writer.write_event(Event::Start(
                    BytesStart::new("test").with_attributes([("name", test.name.as_str())]),
                ))?;
                for class in &test.classes {
                    writer.write_event(Event::Start(
                        BytesStart::new("class").with_attributes([("name", class.name.as_str())]),
                    ))?;
                    for test_method in &class.test_methods {
                        Self::serialize_test_method(&mut writer, test_method)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new("class")))?;
                }
                writer.write_event(Event::End(BytesEnd::new("test")))?;
            }
            writer.write_event(Event::End(BytesEnd::new("suite")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("testng-results")))?;
        Ok(())
    }

    pub fn to_xml_string(&self) -> Result<String> {
        let mut serialized_report = Vec::new();
        self.serialize(&mut serialized_report)?;
        Ok(String::from_utf8(serialized_report)?)
    }

    fn serialize_test_method<W: Write>(
        writer: &mut Writer<W>,
        test_method: &TestNgTestMethod,
    ) -> Result<()> {
        let duration_ms = test_method.duration.as_millis().to_string();
        let mut element = BytesStart::new("test-method").with_attributes([
            ("status", test_method.status.as_str()),
            ("name", test_method.name.as_str()),
            ("duration-ms", duration_ms.as_str()),
        ]);
        if test_method.is_config {
            element.push_attribute(("is-config", "true"));
        }

        let Some(exception) = &test_method.exception else {
            writer.write_event(Event::Empty(element))?;
            return Ok(());
        };

        writer.write_event(Event::Start(element))?;
        writer.write_event(Event::Start(
            BytesStart::new("exception").with_attributes([("class", exception.class.as_str())]),
        ))?;
        writer.write_event(Event::Start(BytesStart::new("message")))?;
        writer.write_event(Event::CData(BytesCData::new(exception.message.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new("message")))?;
        writer.write_event(Event::Start(BytesStart::new("full-stacktrace")))?;
        writer.write_event(Event::CData(BytesCData::new(
            exception.full_stacktrace.as_str(),
        )))?;
        writer.write_event(Event::End(BytesEnd::new("full-stacktrace")))?;
        writer.write_event(Event::End(BytesEnd::new("exception")))?;
        writer.write_event(Event::End(BytesEnd::new("test-method")))?;
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Default)]
struct JunitTestSuiteCounts {
    tests: usize,
    failures: usize,
    errors: usize,
    skipped: usize,
}

impl From<&TestSuite> for JunitTestSuiteCounts {
    fn from(test_suite: &TestSuite) -> Self {
        test_suite
            .test_cases
            .iter()
            .fold(Self::default(), |mut counts, test_case| {
                counts.tests += 1;
                match &test_case.status {
                    TestCaseStatus::Success { .. } => (),
                    TestCaseStatus::NonSuccess {
                        kind: NonSuccessKind::Failure,
                        ..
                    } => counts.failures += 1,
                    TestCaseStatus::NonSuccess {
                        kind: NonSuccessKind::Error,
                        ..
                    } => counts.errors += 1,
                    TestCaseStatus::Skipped { .. } => counts.skipped += 1,
                }
                counts
            })
    }
}

#[derive(Debug, Clone)]
pub struct ReportMock {
    seed: u64,
    options: Options,

    // state for generating reports
    rng: StdRng,
    timestamp: DateTime<FixedOffset>,
}

impl ReportMock {
    pub fn new(options: Options) -> Self {
        let (seed, rng) = ReportMock::rng_from_seed(&options);
        let timestamp = options.global.timestamp.unwrap_or_default();
        Self {
            seed,
            options,
            rng,
            timestamp,
        }
    }

    fn rng_from_seed(options: &Options) -> (u64, StdRng) {
        let seed = options.global.seed.unwrap_or_else(rand::random);
        (seed, StdRng::seed_from_u64(seed))
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }

    pub fn generate_junit_reports(&mut self) -> Vec<Report> {
        self.timestamp = self
            .options
            .global
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().fixed_offset());

        (0..self.options.global.report_count)
            .map(|_| {
                let report_name: String =
                    fake::faker::company::en::Buzzword().fake_with_rng(&mut self.rng);
                let mut report = Report::new(report_name);
                report.set_timestamp(self.timestamp);
                let test_suites = self.generate_junit_test_suites();
                let time: Duration = test_suites
                    .iter()
                    .filter_map(|test_suite| test_suite.time)
                    .sum();
                report.add_test_suites(test_suites);
                report.set_time(time);
                report
            })
            .collect()
    }

    /// Serializes a JUnit report with `tests`, `failures`, `errors` and `skipped` counters on
    /// every `testsuite` element.
    ///
    /// Without the `testsuites` element a document can only hold a single `testsuite`; see
    /// [`ReportMock::split_test_suites`].
    pub fn serialize_junit<W: Write>(&self, writer: W, report: &Report) -> Result<()> {
        let skip_testsuites = self.options.junit.do_not_render_testsuites_element;
        if skip_testsuites && report.test_suites.len() > 1 {
            anyhow::bail!(
                "cannot serialize {} test suites without the `testsuites` element",
                report.test_suites.len()
            );
        }

        let serialized_report = report.to_string()?;
        let mut reader = Reader::from_str(&serialized_report);
        reader.config_mut().trim_text(true);
        let mut writer = Writer::new_with_indent(writer, b' ', 4);
        let mut test_suite_counts = report.test_suites.iter().map(JunitTestSuiteCounts::from);
        loop {
            match reader.read_event()? {
                Event::Start(e) if skip_testsuites && e.name().as_ref() == b"testsuites" => {}
                Event::End(e) if skip_testsuites && e.name().as_ref() == b"testsuites" => {}
                Event::Start(e) if e.name().as_ref() == b"testsuite" => {
                    let counts = test_suite_counts.next().unwrap_or_default();
                    writer.write_event(Event::Start(with_junit_counts(&e, counts)?))?;
                }
                Event::Empty(e) if e.name().as_ref() == b"testsuite" => {
                    let counts = test_suite_counts.next().unwrap_or_default();
                    writer.write_event(Event::Empty(with_junit_counts(&e, counts)?))?;
                }
                Event::Eof => break,
                e => writer.write_event(e)?,
            }
        }
        Ok(())
    }

    pub fn junit_to_string(&self, report: &Report) -> Result<String> {
        let mut serialized_report = Vec::new();
        self.serialize_junit(&mut serialized_report, report)?;
        Ok(String::from_utf8(serialized_report)?)
    }

    /// One report per test suite, each keeping the name and timestamp of the original.
    pub fn split_test_suites(report: &Report) -> Vec<Report> {
        report
            .test_suites
            .iter()
            .map(|test_suite| {
                let mut single_suite_report = Report::new(report.name.clone());
                if let Some(timestamp) = report.timestamp {
                    single_suite_report.set_timestamp(timestamp);
                }
                if let Some(time) = test_suite.time {
                    single_suite_report.set_time(time);
                }
                single_suite_report.add_test_suite(test_suite.clone());
                single_suite_report
            })
            .collect()
    }

    /// Writes `junit-{i}.xml` per report, or `junit-{i}-{j}.xml` per test suite when the
    /// `testsuites` element is not rendered.
    pub fn write_junit_reports_to_file<T: AsRef<Path>, U: AsRef<[Report]>>(
        &self,
        directory: T,
        reports: U,
    ) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for (i, report) in reports.as_ref().iter().enumerate() {
            if self.options.junit.do_not_render_testsuites_element {
                for (j, single_suite_report) in
                    Self::split_test_suites(report).iter().enumerate()
                {
                    let path = directory.as_ref().join(format!("junit-{}-{}.xml", i, j));
                    self.serialize_junit(File::create(&path)?, single_suite_report)?;
                    paths.push(path);
                }
            } else {
                let path = directory.as_ref().join(format!("junit-{}.xml", i));
                self.serialize_junit(File::create(&path)?, report)?;
                paths.push(path);
            }
        }
        Ok(paths)
    }

    pub fn generate_testng_reports(&mut self) -> Vec<TestNgReport> {
        (0..self.options.global.report_count)
            .map(|_| self.generate_testng_report())
            .collect()
    }

    pub fn generate_testng_report(&mut self) -> TestNgReport {
        let suites = (0..self.options.testng.testng_suite_count)
            .map(|_| TestNgSuite {
                name: self.fake_name(),
                tests: (0..self.options.testng.testng_test_count)
                    .map(|_| TestNgTest {
                        name: self.fake_name(),
                        classes: (0..self.options.testng.testng_class_count)
                            .map(|_| self.generate_testng_class())
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        TestNgReport { suites }
    }

    pub fn write_testng_reports_to_file<T: AsRef<Path>, U: AsRef<[TestNgReport]>>(
        &self,
        directory: T,
        reports: U,
    ) -> Result<Vec<PathBuf>> {
        reports.as_ref().iter().enumerate().try_fold(
            Vec::new(),
            |mut acc, (i, report)| -> Result<Vec<PathBuf>> {
                let path = directory.as_ref().join(format!("testng-results-{}.xml", i));
                report.serialize(File::create(&path)?)?;
                acc.push(path);
                Ok(acc)
            },
        )
    }

    fn generate_junit_test_suites(&mut self) -> Vec<TestSuite> {
        (0..self.options.junit.junit_test_suite_count)
            .map(|_| -> TestSuite {
                let mut test_suite = TestSuite::new(self.fake_name());
                test_suite.set_timestamp(self.timestamp);
                let test_cases = self.generate_junit_test_cases();
                let time: Duration = test_cases
                    .iter()
                    .filter_map(|test_case| test_case.time)
                    .sum();
                test_suite.add_test_cases(test_cases);
                test_suite.set_time(time);
                test_suite
            })
            .collect()
    }

    fn generate_junit_test_cases(&mut self) -> Vec<TestCase> {
        (0..self.options.junit.junit_test_case_count)
            .map(|_| -> TestCase {
                let test_case_status = self.generate_junit_test_case_status();
                let is_skipped = matches!(&test_case_status, TestCaseStatus::Skipped { .. });

                let mut test_case = TestCase::new(self.fake_name(), test_case_status);
                test_case.set_classname(self.fake_classname());
                test_case.set_timestamp(self.timestamp);
                let duration = if is_skipped {
                    Duration::default()
                } else {
                    self.fake_duration(self.options.junit.junit_test_case_duration_range.clone())
                };
                test_case.set_time(duration);

                if self.rand_bool(self.options.junit.junit_sys_out_percentage) {
                    test_case.set_system_out(self.fake_paragraphs());
                    test_case.set_system_err(self.fake_paragraphs());
                }
                test_case
            })
            .collect()
    }

    fn generate_junit_test_case_status(&mut self) -> TestCaseStatus {
        let percentages: Vec<u8> = self
            .options
            .junit
            .junit_success_to_skip_to_fail_to_error_percentage
            .iter()
            .flatten()
            .copied()
            .collect();
        match self.weighted_index(&percentages) {
            1 => {
                let mut status = TestCaseStatus::skipped();
                status.set_message(self.fake_sentence());
                status
            }
            i @ (2 | 3) => {
                let mut status = TestCaseStatus::non_success(if i == 2 {
                    NonSuccessKind::Failure
                } else {
                    NonSuccessKind::Error
                });
                status.set_message(self.fake_sentence());
                status.set_type(self.fake_exception_class());
                status.set_description(self.fake_paragraphs());
                status
            }
            _ => TestCaseStatus::success(),
        }
    }

    fn generate_testng_class(&mut self) -> TestNgClass {
        let with_config_methods =
            self.rand_bool(self.options.testng.testng_config_method_percentage);
        let mut test_methods = Vec::new();
        for _ in 0..self.options.testng.testng_test_method_count {
            if with_config_methods {
                test_methods.push(self.generate_testng_config_method("setUp"));
            }
            test_methods.push(self.generate_testng_test_method());
            if with_config_methods {
                test_methods.push(self.generate_testng_config_method("tearDown"));
            }
        }
        TestNgClass {
            name: self.fake_classname(),
            test_methods,
        }
    }

    fn generate_testng_config_method(&mut self, name: &str) -> TestNgTestMethod {
        TestNgTestMethod {
            name: String::from(name),
            status: TestNgStatus::Pass,
            duration: Duration::from_millis(self.rng.gen_range(0..10)),
            is_config: true,
            exception: None,
        }
    }

    fn generate_testng_test_method(&mut self) -> TestNgTestMethod {
        let percentages: Vec<u8> = self
            .options
            .testng
            .testng_pass_to_fail_to_skip_percentage
            .iter()
            .flatten()
            .copied()
            .collect();
        let status = match self.weighted_index(&percentages) {
            1 => TestNgStatus::Fail,
            2 => TestNgStatus::Skip,
            _ => TestNgStatus::Pass,
        };
        let duration = match status {
            TestNgStatus::Skip => Duration::default(),
            _ => self.fake_duration(
                self.options
                    .testng
                    .testng_test_method_duration_range
                    .clone(),
            ),
        };
        let exception = (status == TestNgStatus::Fail).then(|| TestNgException {
            class: self.fake_exception_class(),
            message: self.fake_sentence(),
            full_stacktrace: self.fake_paragraphs(),
        });
        TestNgTestMethod {
            name: self.fake_name(),
            status,
            // whole milliseconds, which is the resolution of `duration-ms`
            duration: Duration::from_millis(duration.as_millis() as u64),
            is_config: false,
            exception,
        }
    }

    /// Picks an index with the given percentage weights; leftover probability picks index 0.
    fn weighted_index(&mut self, percentages: &[u8]) -> usize {
        let rand_percentage = self.rng.gen_range(1..=100_u8);
        let mut total = 0_u8;
        for (i, percentage) in percentages.iter().enumerate() {
            total += percentage;
            if rand_percentage <= total {
                return i;
            }
        }
        0
    }

    fn fake_name(&mut self) -> String {
        let words: Vec<String> = fake::faker::lorem::en::Words(2..4).fake_with_rng(&mut self.rng);
        words.join("_")
    }

    fn fake_classname(&mut self) -> String {
        let words: Vec<String> = fake::faker::lorem::en::Words(2..4).fake_with_rng(&mut self.rng);
        format!("com.example.{}Test", words.join("."))
    }

    fn fake_exception_class(&mut self) -> String {
        const EXCEPTION_CLASSES: &[&str] = &[
            "java.lang.AssertionError",
            "java.lang.IllegalStateException",
            "java.lang.NullPointerException",
            "org.opentest4j.AssertionFailedError",
        ];
        EXCEPTION_CLASSES
            .choose(&mut self.rng)
            .map(|class| String::from(*class))
            .unwrap_or_default()
    }

    fn fake_sentence(&mut self) -> String {
        let sentences: Vec<String> =
            fake::faker::lorem::en::Sentences(1..2).fake_with_rng(&mut self.rng);
        sentences.join(" ")
    }

    fn fake_paragraphs(&mut self) -> String {
        let paragraphs: Vec<String> =
            fake::faker::lorem::en::Paragraphs(1..3).fake_with_rng(&mut self.rng);
        paragraphs.join("\n")
    }

    fn fake_duration<T: AsRef<[humantime::Duration]>>(&mut self, range: T) -> Duration {
        let range_start = range
            .as_ref()
            .first()
            .map(|start| start.as_nanos())
            .unwrap_or_default();
        let range_end = range
            .as_ref()
            .get(1)
            .map(|end| end.as_nanos())
            .unwrap_or(range_start);
        let rand_duration_ns = self.rng.gen_range(range_start..=range_end.max(range_start));
        Duration::from_nanos(rand_duration_ns as u64)
    }

    fn rand_bool<T: Into<f64>>(&mut self, percentage_chance: T) -> bool {
        self.rng.gen_bool(percentage_chance.into() / 100.0)
    }
}

fn with_junit_counts(
    test_suite: &BytesStart,
    counts: JunitTestSuiteCounts,
) -> Result<BytesStart<'static>> {
    const COUNTER_ATTRS: [&[u8]; 5] = [b"tests", b"failures", b"errors", b"skipped", b"disabled"];

    let mut element = BytesStart::new("testsuite");
    for attr in test_suite.attributes() {
        let attr = attr?;
        if !COUNTER_ATTRS.contains(&attr.key.as_ref()) {
            element.push_attribute(attr);
        }
    }
    let tests = counts.tests.to_string();
    let failures = counts.failures.to_string();
    let errors = counts.errors.to_string();
    let skipped = counts.skipped.to_string();
    element.extend_attributes([
        ("tests", tests.as_str()),
        ("failures", failures.as_str()),
        ("errors", errors.as_str()),
        ("skipped", skipped.as_str()),
    ]);
    Ok(element.into_owned())
}
