use fin_reports::{generate_reports, XlsxReport};

use std::{error::Error, path::PathBuf};

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Builds a Balance Sheet and a Profit & Loss statement from journal entries.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Journal entries (.xlsx, .xls, .ods or .csv) with columns
    /// Date, Description, Type, Debit, Credit
    #[arg(default_value = "journal_entries.xlsx")]
    input: PathBuf,
    /// Workbook to write the statements to
    #[arg(default_value = "financial_reports.xlsx")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut report = XlsxReport::new(args.output);
    let statements = generate_reports(&args.input, &mut report)?;
    debug!("\n{}\n{}", statements.balance_sheet(), statements.profit_and_loss());
    println!("Financial reports saved to {}", report.path().display());

    Ok(())
}
