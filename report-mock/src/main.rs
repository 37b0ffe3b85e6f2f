use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use report_mock::ReportMock;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum MockFormat {
    Junit,
    Testng,
}

#[derive(Debug, Parser)]
pub struct Cli {
    /// Directory to output report XML files
    #[arg(required = true)]
    pub directory: PathBuf,

    /// Report format to generate
    #[arg(long, value_enum, default_value = "junit")]
    pub format: MockFormat,

    #[command(flatten)]
    pub options: report_mock::Options,
}

fn main() -> Result<()> {
    let Cli {
        directory,
        format,
        options,
    } = Cli::try_parse()?;

    let mut rm = ReportMock::new(options);
    println!("Using seed `{}` to generate random data.", rm.get_seed());

    let paths = match format {
        MockFormat::Junit => {
            let reports = rm.generate_junit_reports();
            rm.write_junit_reports_to_file(directory, &reports)?
        }
        MockFormat::Testng => {
            let reports = rm.generate_testng_reports();
            rm.write_testng_reports_to_file(directory, &reports)?
        }
    };

    for path in paths {
        println!("{}", path.display());
    }

    Ok(())
}
