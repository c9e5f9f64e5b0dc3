//! Ledger lines and the General Ledger they are grouped into.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of the General Ledger report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Target account name the line posts to.
    pub account: String,
    /// Transaction date; empty in the report for opening balance rows.
    pub date: Option<NaiveDate>,
    /// Transaction type as printed in the report, e.g. `Invoice`.
    pub txn_type: String,
    /// QuickBooks id of the transaction.
    pub txn_id: Option<String>,
    /// Credit amount.
    pub credit: Decimal,
    /// Debit amount.
    pub debit: Decimal,
}

impl LedgerLine {
    /// Debit and credit of a journal line posting this line's credit when
    /// non-zero, else its debit.
    #[must_use]
    pub fn credit_first(&self) -> (Decimal, Decimal) {
        if self.credit.is_zero() {
            (self.debit, Decimal::ZERO)
        } else {
            (Decimal::ZERO, self.credit)
        }
    }

    /// Debit and credit of a journal line posting this line's debit when
    /// non-zero, else its credit.
    #[must_use]
    pub fn debit_first(&self) -> (Decimal, Decimal) {
        if self.debit.is_zero() {
            (Decimal::ZERO, self.credit)
        } else {
            (self.debit, Decimal::ZERO)
        }
    }
}

/// Lines of one account, in report order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedger {
    /// Target account name.
    pub account: String,
    /// Lines posted to the account.
    pub lines: Vec<LedgerLine>,
}

/// All lines of one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Transaction type.
    pub txn_type: String,
    /// QuickBooks transaction id.
    pub id: String,
    /// Date of the first line.
    pub date: Option<NaiveDate>,
    /// Lines across all accounts.
    pub lines: Vec<LedgerLine>,
}

/// The reconstructed General Ledger.
///
/// Holds the per-account ledgers in registration order and the same lines
/// regrouped by transaction type, then transaction id, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct GeneralLedger {
    accounts: Vec<AccountLedger>,
    entries: HashMap<String, EntryGroup>,
}

#[derive(Debug, Clone, Default)]
struct EntryGroup {
    entries: Vec<LedgerEntry>,
    by_id: HashMap<String, usize>,
}

impl GeneralLedger {
    /// Groups per-account ledgers into transaction entries.
    ///
    /// Lines without a transaction id stay in their account ledger but
    /// belong to no entry.
    #[must_use]
    pub fn from_accounts(accounts: Vec<AccountLedger>) -> Self {
        let mut entries: HashMap<String, EntryGroup> = HashMap::new();

        for line in accounts.iter().flat_map(|account| &account.lines) {
            let Some(id) = line.txn_id.as_deref() else {
                continue;
            };
            let group = entries.entry(line.txn_type.clone()).or_default();
            if let Some(&index) = group.by_id.get(id) {
                group.entries[index].lines.push(line.clone());
            } else {
                group.by_id.insert(id.to_string(), group.entries.len());
                group.entries.push(LedgerEntry {
                    txn_type: line.txn_type.clone(),
                    id: id.to_string(),
                    date: line.date,
                    lines: vec![line.clone()],
                });
            }
        }

        Self { accounts, entries }
    }

    /// Per-account ledgers.
    #[must_use]
    pub fn accounts(&self) -> &[AccountLedger] {
        &self.accounts
    }

    /// Every line, account by account.
    pub fn lines(&self) -> impl Iterator<Item = &LedgerLine> {
        self.accounts.iter().flat_map(|account| &account.lines)
    }

    /// Entries of one transaction type, in first-seen order.
    #[must_use]
    pub fn entries(&self, txn_type: &str) -> &[LedgerEntry] {
        self.entries
            .get(txn_type)
            .map_or(&[], |group| group.entries.as_slice())
    }

    /// The entry of one transaction.
    #[must_use]
    pub fn entry(&self, txn_type: &str, id: &str) -> Option<&LedgerEntry> {
        let group = self.entries.get(txn_type)?;
        group.by_id.get(id).map(|&index| &group.entries[index])
    }

    /// Earliest dated line, used to decide how far back fiscal years reach.
    #[must_use]
    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.lines().filter_map(|line| line.date).min()
    }

    /// Whether the ledger holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(account: &str, txn_type: &str, id: Option<&str>, date: &str) -> LedgerLine {
        LedgerLine {
            account: account.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            txn_type: txn_type.to_string(),
            txn_id: id.map(str::to_string),
            credit: dec!(0),
            debit: dec!(10),
        }
    }

    #[test]
    fn test_entries_group_across_accounts() {
        let ledger = GeneralLedger::from_accounts(vec![
            AccountLedger {
                account: "Checking".into(),
                lines: vec![
                    line("Checking", "Deposit", Some("5"), "2019-02-01"),
                    line("Checking", "Invoice", Some("9"), "2019-01-20"),
                ],
            },
            AccountLedger {
                account: "Sales".into(),
                lines: vec![line("Sales", "Deposit", Some("5"), "2019-02-01")],
            },
        ]);

        let deposit = ledger.entry("Deposit", "5").unwrap();
        assert_eq!(deposit.lines.len(), 2);
        assert_eq!(deposit.lines[1].account, "Sales");
        assert_eq!(ledger.entries("Invoice").len(), 1);
        assert!(ledger.entries("Bill").is_empty());
        assert_eq!(ledger.earliest_date(), NaiveDate::from_ymd_opt(2019, 1, 20));
    }

    #[test]
    fn test_lines_without_id_join_no_entry() {
        let ledger = GeneralLedger::from_accounts(vec![AccountLedger {
            account: "Checking".into(),
            lines: vec![line("Checking", "", None, "2018-12-31")],
        }]);
        assert_eq!(ledger.lines().count(), 1);
        assert!(ledger.entries("").is_empty());
        assert_eq!(ledger.earliest_date(), NaiveDate::from_ymd_opt(2018, 12, 31));
    }

    #[test]
    fn test_posting_sides() {
        let both = LedgerLine {
            credit: dec!(3),
            debit: dec!(4),
            ..line("A", "Invoice", Some("1"), "2019-01-01")
        };
        assert_eq!(both.credit_first(), (dec!(0), dec!(3)));
        assert_eq!(both.debit_first(), (dec!(4), dec!(0)));
    }
}
