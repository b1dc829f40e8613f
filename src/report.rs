use std::path::{Path, PathBuf};

use rust_decimal::{prelude::ToPrimitive, Decimal};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;
use tracing::info;

use super::{
    ledger::{Ledger, LedgerError},
    statement::{StatementError, Statements},
};

pub const BALANCE_SHEET: &str = "Balance Sheet";
pub const PROFIT_AND_LOSS: &str = "Profit & Loss";

const HEADER: [&str; 2] = ["Category", "Amount"];
const COLUMN_WIDTH: f64 = 25.0;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Statement(#[from] StatementError),
    #[error("xlsx error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("amount {0} cannot be written as a spreadsheet number")]
    Amount(Decimal),
}

/// Destination for finished statements.
pub trait ReportSink {
    type Error;

    fn write(&mut self, statements: &Statements) -> Result<(), Self::Error>;
}

/// Writes both statements as sheets of one workbook.
#[derive(Debug, Clone)]
pub struct XlsxReport {
    path: PathBuf,
}

impl XlsxReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn workbook(statements: &Statements) -> Result<Workbook, ReportError> {
        let mut workbook = Workbook::new();
        add_sheet(&mut workbook, BALANCE_SHEET, &statements.balance_sheet().rows())?;
        add_sheet(&mut workbook, PROFIT_AND_LOSS, &statements.profit_and_loss().rows())?;
        Ok(workbook)
    }
}

fn add_sheet(
    workbook: &mut Workbook,
    name: &str,
    rows: &[(&str, Decimal)],
) -> Result<(), ReportError> {
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(name)?;

    for (col, title) in (0u16..).zip(HEADER) {
        sheet.write_string_with_format(0, col, title, &bold)?;
        sheet.set_column_width(col, COLUMN_WIDTH)?;
    }
    for (row, (category, amount)) in (1u32..).zip(rows) {
        let number = amount.to_f64().ok_or(ReportError::Amount(*amount))?;
        sheet.write_string(row, 0, *category)?;
        sheet.write_number(row, 1, number)?;
    }
    Ok(())
}

impl ReportSink for XlsxReport {
    type Error = ReportError;

    /// Builds the whole workbook in memory, then saves it in one step.
    fn write(&mut self, statements: &Statements) -> Result<(), Self::Error> {
        let mut workbook = Self::workbook(statements)?;
        workbook.save(&self.path)?;
        info!(path = %self.path.display(), "saved financial reports");
        Ok(())
    }
}

/// Loads `input`, categorizes every entry and writes the statements to
/// `sink`. Nothing reaches the sink unless loading and categorization both
/// succeed.
pub fn generate_reports<S>(
    input: impl AsRef<Path>,
    sink: &mut S,
) -> Result<Statements, ReportError>
where
    S: ReportSink<Error = ReportError>,
{
    let ledger = Ledger::from_path(input)?;
    let statements = Statements::from_entries(ledger.iter())?;
    sink.write(&statements)?;
    Ok(statements)
}
