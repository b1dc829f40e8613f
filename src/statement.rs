use std::fmt;

use derive_getters::Getters;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use super::entry::{AmountCell, EntryType, JournalEntry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatementError {
    #[error("unknown entry type {value:?} in entry {entry}")]
    UnknownType { entry: usize, value: String },
    #[error("could not convert {column} value {value:?} to a number in entry {entry}")]
    Coercion {
        entry: usize,
        column: &'static str,
        value: String,
    },
    #[error("totals overflowed while adding entry {entry}")]
    Overflow { entry: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct BalanceSheet {
    assets: Decimal,
    liabilities: Decimal,
    equity: Decimal,
}

impl BalanceSheet {
    pub fn total_equity_and_liabilities(&self) -> Decimal {
        self.liabilities + self.equity
    }

    pub fn rows(&self) -> [(&'static str, Decimal); 4] {
        [
            ("Assets", self.assets),
            ("Liabilities", self.liabilities),
            ("Equity", self.equity),
            ("Total Equity and Liabilities", self.total_equity_and_liabilities()),
        ]
    }

    fn checked_add(self, other: Self) -> Option<Self> {
        let sum = Self {
            assets: self.assets.checked_add(other.assets)?,
            liabilities: self.liabilities.checked_add(other.liabilities)?,
            equity: self.equity.checked_add(other.equity)?,
        };
        sum.liabilities.checked_add(sum.equity)?;
        Some(sum)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct ProfitAndLoss {
    income: Decimal,
    expenses: Decimal,
}

impl ProfitAndLoss {
    pub fn profit_or_loss(&self) -> Decimal {
        self.income - self.expenses
    }

    pub fn rows(&self) -> [(&'static str, Decimal); 3] {
        [
            ("Income", self.income),
            ("Expenses", self.expenses),
            ("Profit/Loss", self.profit_or_loss()),
        ]
    }

    fn checked_add(self, other: Self) -> Option<Self> {
        let sum = Self {
            income: self.income.checked_add(other.income)?,
            expenses: self.expenses.checked_add(other.expenses)?,
        };
        sum.income.checked_sub(sum.expenses)?;
        Some(sum)
    }
}

fn write_rows(f: &mut fmt::Formatter<'_>, rows: &[(&str, Decimal)]) -> fmt::Result {
    for (category, amount) in rows {
        writeln!(f, "{category:<30}{amount:>15}")?;
    }
    Ok(())
}

impl fmt::Display for BalanceSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_rows(f, &self.rows())
    }
}

impl fmt::Display for ProfitAndLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_rows(f, &self.rows())
    }
}

/// Both statements produced from one ledger.
///
/// Values are only built through checked arithmetic, so every total and
/// derived line fits in a `Decimal`. Partial results over disjoint slices of
/// a ledger merge with [`Statements::checked_add`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct Statements {
    balance_sheet: BalanceSheet,
    profit_and_loss: ProfitAndLoss,
}

impl Statements {
    /// What a single posting adds to the totals. Assets and expenses carry
    /// debit balances; liabilities, equity and income carry credit balances.
    /// `None` when the net amount does not fit in a `Decimal`.
    pub fn posting(kind: EntryType, debit: Decimal, credit: Decimal) -> Option<Self> {
        let mut delta = Self::default();
        match kind {
            EntryType::Asset => delta.balance_sheet.assets = debit.checked_sub(credit)?,
            EntryType::Liability => delta.balance_sheet.liabilities = credit.checked_sub(debit)?,
            EntryType::Equity => delta.balance_sheet.equity = credit.checked_sub(debit)?,
            EntryType::Income => delta.profit_and_loss.income = credit.checked_sub(debit)?,
            EntryType::Expense => delta.profit_and_loss.expenses = debit.checked_sub(credit)?,
        }
        Some(delta)
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        Some(Self {
            balance_sheet: self.balance_sheet.checked_add(other.balance_sheet)?,
            profit_and_loss: self.profit_and_loss.checked_add(other.profit_and_loss)?,
        })
    }

    /// Categorizes one entry. `entry` is its 1-based position, used in errors.
    pub fn from_entry(entry: usize, journal_entry: &JournalEntry) -> Result<Self, StatementError> {
        let kind = journal_entry
            .entry_type()
            .map_err(|err| StatementError::UnknownType { entry, value: err.0 })?;

        let amount = |column, cell: &AmountCell| {
            cell.amount()
                .map_err(|value| StatementError::Coercion { entry, column, value })
        };
        let debit = amount("Debit", journal_entry.debit())?;
        let credit = amount("Credit", journal_entry.credit())?;

        debug!(entry, %kind, %debit, %credit, bucket = kind.bucket(), "categorized entry");
        Self::posting(kind, debit, credit).ok_or(StatementError::Overflow { entry })
    }

    /// Folds every entry into fresh totals. The first bad entry aborts the
    /// whole run.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, StatementError>
    where
        I: IntoIterator<Item = &'a JournalEntry>,
    {
        let statements = entries
            .into_iter()
            .enumerate()
            .try_fold(Self::default(), |totals, (idx, journal_entry)| {
                let entry = idx + 1;
                let delta = Self::from_entry(entry, journal_entry)?;
                totals
                    .checked_add(delta)
                    .ok_or(StatementError::Overflow { entry })
            })?;

        info!(
            assets = %statements.balance_sheet.assets,
            liabilities = %statements.balance_sheet.liabilities,
            equity = %statements.balance_sheet.equity,
            income = %statements.profit_and_loss.income,
            expenses = %statements.profit_and_loss.expenses,
            "categorized journal entries"
        );
        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::{BalanceSheet, ProfitAndLoss, StatementError, Statements};
    use crate::{AmountCell, EntryType, JournalEntry};

    fn entry(type_: &str, debit: Decimal, credit: Decimal) -> JournalEntry {
        JournalEntry::new(
            "2024-01-01".to_string(),
            "test".to_string(),
            type_.to_string(),
            AmountCell::Number(debit),
            AmountCell::Number(credit),
        )
    }

    fn sample_ledger() -> Vec<JournalEntry> {
        vec![
            entry("Asset", dec!(1000), dec!(0)),
            entry("Liability", dec!(0), dec!(400)),
            entry("Equity", dec!(0), dec!(600)),
            entry("Income", dec!(0), dec!(2000)),
            entry("Expense", dec!(800), dec!(0)),
        ]
    }

    #[test]
    fn categorize_sample_ledger() {
        let statements = Statements::from_entries(&sample_ledger()).unwrap();
        assert_eq!(
            statements.balance_sheet,
            BalanceSheet {
                assets: dec!(1000),
                liabilities: dec!(400),
                equity: dec!(600),
            }
        );
        assert_eq!(statements.balance_sheet.total_equity_and_liabilities(), dec!(1000));
        assert_eq!(
            statements.profit_and_loss,
            ProfitAndLoss {
                income: dec!(2000),
                expenses: dec!(800),
            }
        );
        assert_eq!(statements.profit_and_loss.profit_or_loss(), dec!(1200));
    }

    #[test]
    fn apply_natural_balance_signs() {
        let (debit, credit) = (dec!(30), dec!(100));
        let cases = [
            (EntryType::Asset, dec!(-70)),
            (EntryType::Liability, dec!(70)),
            (EntryType::Equity, dec!(70)),
            (EntryType::Income, dec!(70)),
            (EntryType::Expense, dec!(-70)),
        ];
        for (kind, expected) in cases {
            let s = Statements::posting(kind, debit, credit).unwrap();
            let bucket = match kind {
                EntryType::Asset => s.balance_sheet.assets,
                EntryType::Liability => s.balance_sheet.liabilities,
                EntryType::Equity => s.balance_sheet.equity,
                EntryType::Income => s.profit_and_loss.income,
                EntryType::Expense => s.profit_and_loss.expenses,
            };
            assert_eq!(bucket, expected, "{kind}");
            // nothing leaks into other buckets
            let total = s.balance_sheet.assets
                + s.balance_sheet.liabilities
                + s.balance_sheet.equity
                + s.profit_and_loss.income
                + s.profit_and_loss.expenses;
            assert_eq!(total, expected, "{kind}");
        }
    }

    #[test]
    fn accumulate_repeated_types() {
        let ledger = vec![
            entry("Asset", dec!(500), dec!(0)),
            entry("Asset", dec!(0), dec!(120.25)),
            entry("Expense", dec!(40), dec!(0)),
            entry("Expense", dec!(10), dec!(5)),
        ];
        let statements = Statements::from_entries(&ledger).unwrap();
        assert_eq!(statements.balance_sheet.assets, dec!(379.75));
        assert_eq!(statements.profit_and_loss.expenses, dec!(45));
        assert_eq!(statements.profit_and_loss.profit_or_loss(), dec!(-45));
    }

    #[test]
    fn ignore_entry_order() {
        let ledger = sample_ledger();
        let expected = Statements::from_entries(&ledger).unwrap();

        let reversed: Vec<_> = ledger.iter().rev().cloned().collect();
        assert_eq!(Statements::from_entries(&reversed).unwrap(), expected);

        let mut rotated = ledger.clone();
        rotated.rotate_left(2);
        assert_eq!(Statements::from_entries(&rotated).unwrap(), expected);
    }

    #[test]
    fn merge_partial_totals() {
        let ledger = sample_ledger();
        let (left, right) = ledger.split_at(2);
        let merged = Statements::from_entries(left)
            .unwrap()
            .checked_add(Statements::from_entries(right).unwrap())
            .unwrap();
        assert_eq!(merged, Statements::from_entries(&ledger).unwrap());
    }

    #[test]
    fn empty_ledger_is_all_zero() {
        let ledger: Vec<JournalEntry> = Vec::new();
        let statements = Statements::from_entries(&ledger).unwrap();
        assert_eq!(statements, Statements::default());
        assert_eq!(statements.balance_sheet.total_equity_and_liabilities(), dec!(0));
        assert_eq!(statements.profit_and_loss.profit_or_loss(), dec!(0));
    }

    #[test]
    fn normalize_entry_types() {
        let totals: Vec<_> = ["asset", " Asset ", "ASSET"]
            .into_iter()
            .map(|t| Statements::from_entries(&[entry(t, dec!(10), dec!(3))]).unwrap())
            .collect();
        assert!(totals.iter().all(|s| s.balance_sheet.assets == dec!(7)));
    }

    #[test]
    fn abort_on_unknown_type() {
        let mut ledger = sample_ledger();
        ledger.insert(3, entry("Revenue", dec!(0), dec!(50)));
        assert_eq!(
            Statements::from_entries(&ledger),
            Err(StatementError::UnknownType {
                entry: 4,
                value: "Revenue".to_string()
            })
        );
    }

    #[test]
    fn treat_blank_amounts_as_zero() {
        let ledger = vec![JournalEntry::new(
            String::new(),
            String::new(),
            "Liability".to_string(),
            AmountCell::Blank,
            AmountCell::from_text("250"),
        )];
        let statements = Statements::from_entries(&ledger).unwrap();
        assert_eq!(statements.balance_sheet.liabilities, dec!(250));
    }

    #[test]
    fn abort_on_malformed_amount() {
        let ledger = vec![
            entry("Asset", dec!(1), dec!(0)),
            JournalEntry::new(
                String::new(),
                String::new(),
                "Income".to_string(),
                AmountCell::Blank,
                AmountCell::from_text("12abc"),
            ),
        ];
        let err = Statements::from_entries(&ledger).unwrap_err();
        assert_eq!(
            err,
            StatementError::Coercion {
                entry: 2,
                column: "Credit",
                value: "12abc".to_string()
            }
        );
        assert_eq!(
            err.to_string(),
            "could not convert Credit value \"12abc\" to a number in entry 2"
        );
    }

    #[test]
    fn list_rows_in_report_order() {
        let statements = Statements::from_entries(&sample_ledger()).unwrap();
        let categories = statements.balance_sheet.rows().map(|(c, _)| c).to_vec();
        assert_eq!(
            categories,
            ["Assets", "Liabilities", "Equity", "Total Equity and Liabilities"]
        );
        assert_eq!(
            statements.profit_and_loss.rows(),
            [
                ("Income", dec!(2000)),
                ("Expenses", dec!(800)),
                ("Profit/Loss", dec!(1200)),
            ]
        );
    }

    #[test]
    fn abort_on_overflowing_totals() {
        let big = "70000000000000000000000000000";
        let debit = |type_: &str| {
            JournalEntry::new(
                String::new(),
                String::new(),
                type_.to_string(),
                AmountCell::from_text(big),
                AmountCell::Blank,
            )
        };
        let ledger = vec![entry("Income", dec!(0), dec!(5)), debit("Asset"), debit("Asset")];
        assert_eq!(
            Statements::from_entries(&ledger),
            Err(StatementError::Overflow { entry: 3 })
        );
    }

    #[test]
    fn abort_on_overflowing_posting() {
        let ledger = vec![entry("Asset", Decimal::MAX, Decimal::MIN)];
        let err = Statements::from_entries(&ledger).unwrap_err();
        assert_eq!(err, StatementError::Overflow { entry: 1 });
        assert_eq!(err.to_string(), "totals overflowed while adding entry 1");
    }

    #[test]
    fn abort_on_overflowing_derived_totals() {
        let ledger = vec![
            entry("Liability", dec!(0), Decimal::MAX),
            entry("Equity", dec!(0), Decimal::MAX),
        ];
        assert_eq!(
            Statements::from_entries(&ledger),
            Err(StatementError::Overflow { entry: 2 })
        );

        let ledger = vec![
            entry("Income", dec!(0), Decimal::MAX),
            entry("Expense", Decimal::MIN, dec!(0)),
        ];
        assert_eq!(
            Statements::from_entries(&ledger),
            Err(StatementError::Overflow { entry: 2 })
        );
    }
}
