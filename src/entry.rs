use std::{fmt, str::FromStr};

use derive_getters::Getters;
use derive_more::Constructor;
use rust_decimal::Decimal;
use thiserror::Error;

/// The five account kinds a journal entry can post to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown entry type: {0}")]
pub struct UnknownEntryType(pub String);

impl EntryType {
    /// Name of the statement line this kind accumulates into.
    pub fn bucket(self) -> &'static str {
        match self {
            EntryType::Asset => "Assets",
            EntryType::Liability => "Liabilities",
            EntryType::Equity => "Equity",
            EntryType::Income => "Income",
            EntryType::Expense => "Expenses",
        }
    }
}

/// Trims and capitalizes (first letter upper, rest lower), so `" asset"`,
/// `"ASSET"` and `"Asset"` all read as [`EntryType::Asset`].
fn normalize(raw: &str) -> String {
    let mut chars = raw.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

impl FromStr for EntryType {
    type Err = UnknownEntryType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "Asset" => Ok(EntryType::Asset),
            "Liability" => Ok(EntryType::Liability),
            "Equity" => Ok(EntryType::Equity),
            "Income" => Ok(EntryType::Income),
            "Expense" => Ok(EntryType::Expense),
            _ => Err(UnknownEntryType(normalized)),
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryType::Asset => "Asset",
            EntryType::Liability => "Liability",
            EntryType::Equity => "Equity",
            EntryType::Income => "Income",
            EntryType::Expense => "Expense",
        };
        f.write_str(name)
    }
}

/// A Debit or Credit cell as it was read. Coercion to an amount happens at
/// categorization time, not at load time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AmountCell {
    #[default]
    Blank,
    Number(Decimal),
    Text(String),
}

impl AmountCell {
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            AmountCell::Blank
        } else {
            AmountCell::Text(text.to_owned())
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            AmountCell::Blank => true,
            AmountCell::Text(text) => text.trim().is_empty(),
            AmountCell::Number(_) => false,
        }
    }

    /// Blank cells count as zero. Text must parse as a plain or scientific
    /// decimal; the untouched cell text is returned on failure.
    pub fn amount(&self) -> Result<Decimal, String> {
        match self {
            AmountCell::Blank => Ok(Decimal::ZERO),
            AmountCell::Number(num) => Ok(*num),
            AmountCell::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(Decimal::ZERO);
                }
                Decimal::from_str(trimmed)
                    .or_else(|_| Decimal::from_scientific(trimmed))
                    .map_err(|_| text.clone())
            }
        }
    }
}

/// One ledger row. `date` and `description` are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Constructor, Getters)]
pub struct JournalEntry {
    date: String,
    description: String,
    type_: String,
    debit: AmountCell,
    credit: AmountCell,
}

impl JournalEntry {
    pub fn is_blank(&self) -> bool {
        self.date.trim().is_empty()
            && self.description.trim().is_empty()
            && self.type_.trim().is_empty()
            && self.debit.is_blank()
            && self.credit.is_blank()
    }

    pub fn entry_type(&self) -> Result<EntryType, UnknownEntryType> {
        self.type_.parse()
    }
}
