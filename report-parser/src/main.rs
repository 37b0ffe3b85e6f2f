use std::{fs, io::BufReader, path::PathBuf};

use clap::{Parser, Subcommand};
use report_parser::{validator, ParseOptions, ParseResult, ParsedReport, ReportParser};
use serde_json::json;
use tracing::metadata::LevelFilter;
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(version, about = "Utilities for working with JUnit and TestNG test reports.")]
pub struct Cli {
    /// Log level filter, e.g. `debug` or `warn`
    #[arg(long, env = "REPORT_UTIL_LOG", default_value = "info", global = true)]
    log_level: LevelFilter,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Parse a report and print the result as JSON
    Parse {
        /// JUnit or TestNG XML file to parse
        report_xml_file: PathBuf,
        /// Opaque identifier of the run the report belongs to
        #[arg(long)]
        run_id: Option<String>,
        /// Truncate text fields longer than this many bytes
        #[arg(long, env = "REPORT_MAX_TEXT_FIELD_LEN", default_value_t = ParseOptions::default().max_text_field_len)]
        max_text_field_len: usize,
        /// Drop `system-out` and `system-err` text from outcomes
        #[arg(long)]
        no_output: bool,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Parse a report and print its quality issues
    Validate {
        /// JUnit or TestNG XML file to validate
        report_xml_file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let Cli { log_level, command } = Cli::parse();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(log_level)
        .init();

    match command {
        Command::Parse {
            report_xml_file,
            run_id,
            max_text_field_len,
            no_output,
            pretty,
        } => {
            let report_parser = ReportParser::new(ParseOptions {
                max_text_field_len,
                capture_output: !no_output,
            });
            let raw_report = fs::read(&report_xml_file)?;
            let parse_result = match run_id {
                Some(run_id) => report_parser.parse_run(&run_id, raw_report),
                None => report_parser.parse(raw_report),
            };

            let output = if pretty {
                serde_json::to_string_pretty(&parse_result)?
            } else {
                serde_json::to_string(&parse_result)?
            };
            println!("{}", output);

            if let ParseResult::Failed { error_message } = parse_result {
                return Err(anyhow::anyhow!(
                    "failed to parse {}: {}",
                    report_xml_file.display(),
                    error_message
                ));
            }
        }
        Command::Validate { report_xml_file } => {
            let file = fs::File::open(&report_xml_file)?;
            let ParsedReport { summary, outcomes } =
                ReportParser::default().try_parse(BufReader::new(file))?;

            let validation = validator::validate(&summary, &outcomes);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "summary": summary,
                    "level": validation.max_level(),
                    "issues": validation.all_issues_flat(),
                }))?
            );
        }
    }
    Ok(())
}
