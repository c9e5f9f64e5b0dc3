//! Rebuilds per-transaction ledger entries from the General Ledger report.
//!
//! The report lists lines per account section. Reconstruction walks the
//! section tree once, resolving every section header to a target account,
//! and folds the lines into per-account ledgers. A nested section registers
//! its account before the enclosing one. [`GeneralLedger::from_accounts`] then
//! regroups the lines by transaction.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use super::entry::{AccountLedger, GeneralLedger, LedgerLine};
use super::report::{ColData, DataRow, Report, ReportRow, Section};

/// Header value of the section collecting lines QuickBooks could not assign.
pub const NOT_SPECIFIED: &str = "Not Specified";

/// Errors raised while reconstructing the ledger.
#[derive(Debug, Error)]
pub enum ReconstructError {
    /// A section header id has no imported account.
    #[error("No imported account for QuickBooks account id {0}")]
    UnknownAccountId(String),

    /// A section header name matches no QuickBooks account.
    #[error("No QuickBooks account named {0:?}")]
    UnknownAccountName(String),

    /// An amount cell is not a number.
    #[error("Invalid amount {value:?} in General Ledger report")]
    InvalidAmount {
        /// Cell text.
        value: String,
        /// Parse failure.
        #[source]
        source: rust_decimal::Error,
    },

    /// A date cell is not an ISO date.
    #[error("Invalid date {value:?} in General Ledger report")]
    InvalidDate {
        /// Cell text.
        value: String,
        /// Parse failure.
        #[source]
        source: chrono::ParseError,
    },
}

/// Lookups from report headers to target account names.
///
/// Headers normally carry the QuickBooks account id. Some companies (UK
/// editions in particular) only print the account name, which is first mapped
/// back to the QuickBooks id.
#[derive(Debug, Clone, Default)]
pub struct AccountIndex {
    by_quickbooks_id: HashMap<String, String>,
    id_by_display_name: HashMap<String, String>,
}

impl AccountIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the target account created for a QuickBooks account id.
    pub fn insert_account(&mut self, quickbooks_id: impl Into<String>, name: impl Into<String>) {
        self.by_quickbooks_id.insert(quickbooks_id.into(), name.into());
    }

    /// Records the QuickBooks id behind a display name.
    pub fn insert_display_name(
        &mut self,
        display_name: impl Into<String>,
        quickbooks_id: impl Into<String>,
    ) {
        self.id_by_display_name
            .insert(display_name.into(), quickbooks_id.into());
    }

    /// Target account for a QuickBooks account id.
    #[must_use]
    pub fn account_by_id(&self, quickbooks_id: &str) -> Option<&str> {
        self.by_quickbooks_id.get(quickbooks_id).map(String::as_str)
    }

    /// Target account for a QuickBooks display name.
    #[must_use]
    pub fn account_by_display_name(&self, display_name: &str) -> Option<&str> {
        let id = self.id_by_display_name.get(display_name)?;
        self.account_by_id(id)
    }
}

enum Header {
    Inherit,
    Skip,
    Account(String),
}

fn resolve_header(section: &Section, index: &AccountIndex) -> Result<Header, ReconstructError> {
    let Some(cell) = section.account_cell() else {
        return Ok(Header::Inherit);
    };

    if let Some(id) = cell.id.as_deref().filter(|id| !id.is_empty()) {
        return index
            .account_by_id(id)
            .map(|name| Header::Account(name.to_string()))
            .ok_or_else(|| ReconstructError::UnknownAccountId(id.to_string()));
    }

    match cell.value.as_str() {
        "" => Ok(Header::Inherit),
        NOT_SPECIFIED => Ok(Header::Skip),
        name => index
            .account_by_display_name(name)
            .map(|account| Header::Account(account.to_string()))
            .ok_or_else(|| ReconstructError::UnknownAccountName(name.to_string())),
    }
}

/// Rebuilds the General Ledger from the report.
///
/// # Errors
///
/// Fails on the first header that cannot be resolved to an imported account
/// and on malformed amount or date cells.
pub fn reconstruct(report: &Report, index: &AccountIndex) -> Result<GeneralLedger, ReconstructError> {
    let ledgers = report
        .rows
        .row
        .iter()
        .try_fold(Vec::new(), |ledgers, row| match row {
            ReportRow::Section(section) => collect_section(section, None, index, ledgers),
            ReportRow::Data(_) => Ok(ledgers),
        })?;

    Ok(GeneralLedger::from_accounts(ledgers))
}

fn collect_section(
    section: &Section,
    inherited: Option<&str>,
    index: &AccountIndex,
    mut ledgers: Vec<AccountLedger>,
) -> Result<Vec<AccountLedger>, ReconstructError> {
    let account = match resolve_header(section, index)? {
        Header::Skip => return Ok(ledgers),
        Header::Inherit => inherited.map(str::to_string),
        Header::Account(name) => Some(name),
    };

    let mut lines = Vec::new();
    for row in &section.rows.row {
        match row {
            ReportRow::Data(data) => lines.push(parse_data_row(data)?),
            ReportRow::Section(nested) => {
                ledgers = collect_section(nested, account.as_deref(), index, ledgers)?;
            }
        }
    }

    let Some(account) = account else {
        if !lines.is_empty() {
            warn!(count = lines.len(), "Skipping ledger lines outside any account section");
        }
        return Ok(ledgers);
    };

    Ok(register(ledgers, account, lines))
}

struct RowValues {
    date: Option<NaiveDate>,
    txn_type: String,
    txn_id: Option<String>,
    credit: Decimal,
    debit: Decimal,
}

fn register(
    mut ledgers: Vec<AccountLedger>,
    account: String,
    rows: Vec<RowValues>,
) -> Vec<AccountLedger> {
    let lines = rows.into_iter().map(|row| LedgerLine {
        account: account.clone(),
        date: row.date,
        txn_type: row.txn_type,
        txn_id: row.txn_id,
        credit: row.credit,
        debit: row.debit,
    });

    match ledgers.iter_mut().find(|ledger| ledger.account == account) {
        Some(ledger) => ledger.lines.extend(lines),
        None => {
            let lines: Vec<LedgerLine> = lines.collect();
            ledgers.push(AccountLedger { account, lines });
        }
    }
    ledgers
}

fn parse_data_row(row: &DataRow) -> Result<RowValues, ReconstructError> {
    let empty = ColData::default();
    let cell = |index| row.cell(index).unwrap_or(&empty);
    let kind = cell(1);

    Ok(RowValues {
        date: parse_date(&cell(0).value)?,
        txn_type: kind.value.clone(),
        txn_id: kind.id.clone().filter(|id| !id.is_empty()),
        credit: parse_amount(&cell(2).value)?,
        debit: parse_amount(&cell(3).value)?,
    })
}

/// Parses a report amount. Empty cells are zero; thousands separators are
/// ignored.
///
/// # Errors
///
/// Returns [`ReconstructError::InvalidAmount`] for non-numeric text.
pub fn parse_amount(value: &str) -> Result<Decimal, ReconstructError> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(&cleaned).map_err(|source| ReconstructError::InvalidAmount {
        value: value.to_string(),
        source,
    })
}

fn parse_date(value: &str) -> Result<Option<NaiveDate>, ReconstructError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|source| ReconstructError::InvalidDate {
            value: value.to_string(),
            source,
        })
}

#[cfg(test)]
#[path = "reconstruct_tests.rs"]
mod tests;
