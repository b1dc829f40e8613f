use std::{
    io::Read,
    path::{Path, PathBuf},
};

use calamine::{open_workbook_auto, Data, DataType, Reader};
use derive_more::{Constructor, Deref};
use rust_decimal::{prelude::FromPrimitive, Decimal};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::entry::{AmountCell, JournalEntry};

pub const REQUIRED_COLUMNS: [&str; 5] = ["Date", "Description", "Type", "Debit", "Credit"];

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

static EMPTY_CELL: Data = Data::Empty;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("file {} not found", .0.display())]
    NotFound(PathBuf),
    #[error(
        "input must contain columns: {} (missing: {})",
        REQUIRED_COLUMNS.join(", "),
        .missing.join(", ")
    )]
    Schema { missing: Vec<&'static str> },
    #[error("unsupported input format: {0:?}")]
    UnsupportedFormat(String),
    #[error("workbook has no worksheets")]
    EmptyWorkbook,
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
}

/// Positions of the required columns within a header row.
struct Columns([usize; 5]);

impl Columns {
    fn locate<S: AsRef<str>>(header: &[S]) -> Result<Self, LedgerError> {
        let position =
            |name: &str| header.iter().position(|col| col.as_ref().trim() == name);

        let missing: Vec<_> = REQUIRED_COLUMNS
            .into_iter()
            .filter(|name| position(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(LedgerError::Schema { missing });
        }

        let mut idx = [0; 5];
        for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = position(name).unwrap_or_default();
        }
        Ok(Self(idx))
    }

    fn entry_from_cells(&self, row: &[Data]) -> JournalEntry {
        let [date, description, type_, debit, credit] =
            self.0.map(|i| row.get(i).unwrap_or(&EMPTY_CELL));
        JournalEntry::new(
            date_text(date),
            text(description),
            text(type_),
            amount_cell(debit),
            amount_cell(credit),
        )
    }
}

fn text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn date_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|date| date.to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => text(other),
    }
}

fn amount_cell(cell: &Data) -> AmountCell {
    match cell {
        Data::Empty => AmountCell::Blank,
        Data::Int(num) => AmountCell::Number(Decimal::from(*num)),
        Data::Float(num) => Decimal::from_f64(*num)
            .map(AmountCell::Number)
            .unwrap_or_else(|| AmountCell::Text(num.to_string())),
        Data::String(s) => AmountCell::from_text(s),
        other => AmountCell::Text(other.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Type")]
    type_: String,
    #[serde(rename = "Debit")]
    debit: String,
    #[serde(rename = "Credit")]
    credit: String,
}

impl From<CsvRow> for JournalEntry {
    fn from(row: CsvRow) -> Self {
        JournalEntry::new(
            row.date,
            row.description,
            row.type_,
            AmountCell::from_text(&row.debit),
            AmountCell::from_text(&row.credit),
        )
    }
}

/// Journal entries in input order. Fully blank rows are dropped.
#[derive(Debug, PartialEq, Constructor, Deref)]
pub struct Ledger(Vec<JournalEntry>);

impl Ledger {
    /// Loads a ledger, choosing the reader from the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LedgerError::NotFound(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let ledger = if extension == "csv" {
            Self::from_csv(path)?
        } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
            Self::from_workbook(path)?
        } else {
            return Err(LedgerError::UnsupportedFormat(extension));
        };

        info!(path = %path.display(), entries = ledger.len(), "loaded journal entries");
        Ok(ledger)
    }

    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        Self::from_csv_reader(csv::Reader::from_path(path)?)
    }

    /// Header names are trimmed before both the schema check and row
    /// deserialization.
    pub fn from_csv_reader<R: Read>(mut rdr: csv::Reader<R>) -> Result<Self, LedgerError> {
        let header: csv::StringRecord = rdr.headers()?.iter().map(str::trim).collect();
        Columns::locate(&header.iter().collect::<Vec<_>>()[..])?;
        rdr.set_headers(header);

        rdr.deserialize::<CsvRow>()
            .map(|row| row.map(JournalEntry::from))
            .filter(|entry| !entry.as_ref().is_ok_and(JournalEntry::is_blank))
            .collect::<Result<_, _>>()
            .map(Self)
            .map_err(LedgerError::from)
    }

    /// Reads the first worksheet; its first row is the header.
    pub fn from_workbook(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(LedgerError::EmptyWorkbook)??;

        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .map(|row| row.iter().map(text).collect())
            .unwrap_or_default();
        let columns = Columns::locate(&header[..])?;
        debug!(?header, "located ledger columns");

        Ok(Self(
            rows.map(|row| columns.entry_from_cells(row))
                .filter(|entry| !entry.is_blank())
                .collect(),
        ))
    }
}
