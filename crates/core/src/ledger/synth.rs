//! Turns reconstructed ledger entries into journal entries.
//!
//! No balancing correction is applied: an entry whose lines do not balance
//! produces a journal entry that the store rejects.

use rust_decimal::Decimal;
use thiserror::Error;

use super::entry::{LedgerEntry, LedgerLine};
use crate::document::{JournalEntryDoc, JournalLine};
use crate::settings::CompanySettings;
use crate::source::GlEntryKind;

/// Errors raised while synthesizing a journal entry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SynthError {
    /// The entry has no dated line to post on.
    #[error("Ledger entry {0} has no posting date")]
    MissingDate(String),
}

/// Journal rows for every line of `entry`, choosing each row's side with
/// `side`.
pub fn journal_lines(
    entry: &LedgerEntry,
    cost_center: &str,
    side: impl Fn(&LedgerLine) -> (Decimal, Decimal),
) -> Vec<JournalLine> {
    entry
        .lines
        .iter()
        .map(|line| {
            let (debit, credit) = side(line);
            JournalLine::new(line.account.clone(), debit, credit, cost_center)
        })
        .collect()
}

/// Builds the journal entry for a GL-only transaction.
///
/// Each line posts its credit when non-zero, else its debit. The document is
/// keyed by [`GlEntryKind::key`], so all tax payment variants share one key
/// space.
///
/// # Errors
///
/// Returns [`SynthError::MissingDate`] when the entry has no date.
pub fn synthesize_journal_entry(
    kind: GlEntryKind,
    entry: &LedgerEntry,
    settings: &CompanySettings,
) -> Result<JournalEntryDoc, SynthError> {
    let quickbooks_id = kind.key(&entry.id);
    let posting_date = entry
        .date
        .ok_or_else(|| SynthError::MissingDate(quickbooks_id.clone()))?;

    Ok(JournalEntryDoc {
        accounts: journal_lines(entry, &settings.cost_center, LedgerLine::credit_first),
        quickbooks_id,
        company: settings.company.clone(),
        posting_date,
    })
}
