mod entry;
mod ledger;
mod report;
mod statement;

pub use self::{
    entry::{AmountCell, EntryType, JournalEntry, UnknownEntryType},
    ledger::{Ledger, LedgerError, REQUIRED_COLUMNS},
    report::{
        generate_reports, ReportError, ReportSink, XlsxReport, BALANCE_SHEET, PROFIT_AND_LOSS,
    },
    statement::{BalanceSheet, ProfitAndLoss, StatementError, Statements},
};
