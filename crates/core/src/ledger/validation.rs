//! Balance rules every journal entry must pass before it is stored.

use rust_decimal::Decimal;
use thiserror::Error;

/// Validation errors for journal postings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerValidationError {
    /// Postings do not balance.
    #[error("Journal entry is unbalanced: debits ({debits}) != credits ({credits})")]
    Unbalanced {
        /// Total debit amount.
        debits: Decimal,
        /// Total credit amount.
        credits: Decimal,
    },

    /// Journal entry has no postings.
    #[error("Journal entry must have at least one line")]
    NoEntries,

    /// A posting has neither a debit nor a credit.
    #[error("Row {row}: both debit and credit are zero")]
    ZeroAmount {
        /// 1-based row number.
        row: usize,
    },

    /// A posting has both a debit and a credit.
    #[error("Row {row}: debit and credit cannot both be set")]
    BothSides {
        /// 1-based row number.
        row: usize,
    },
}

impl LedgerValidationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::NoEntries => "NO_ENTRIES",
            Self::ZeroAmount { .. } => "ZERO_AMOUNT",
            Self::BothSides { .. } => "BOTH_SIDES",
        }
    }
}

/// Anything with a debit and a credit column.
pub trait Posting {
    /// Debit amount.
    fn debit(&self) -> Decimal;
    /// Credit amount.
    fn credit(&self) -> Decimal;
}

impl Posting for super::LedgerLine {
    fn debit(&self) -> Decimal {
        self.debit
    }

    fn credit(&self) -> Decimal {
        self.credit
    }
}

/// Validates that a set of postings is balanced.
///
/// Amounts may be negative (QuickBooks reverses with negative lines) but each
/// row sits on exactly one side, and debits must equal credits exactly.
///
/// # Errors
///
/// Returns an error if the postings are empty, a row is on no side or on
/// both, or the totals differ.
pub fn validate_postings<P: Posting>(postings: &[P]) -> Result<(), LedgerValidationError> {
    if postings.is_empty() {
        return Err(LedgerValidationError::NoEntries);
    }

    let mut total_debits = Decimal::ZERO;
    let mut total_credits = Decimal::ZERO;

    for (index, posting) in postings.iter().enumerate() {
        let (debit, credit) = (posting.debit(), posting.credit());
        match (debit.is_zero(), credit.is_zero()) {
            (true, true) => return Err(LedgerValidationError::ZeroAmount { row: index + 1 }),
            (false, false) => return Err(LedgerValidationError::BothSides { row: index + 1 }),
            _ => {}
        }
        total_debits += debit;
        total_credits += credit;
    }

    if total_debits != total_credits {
        return Err(LedgerValidationError::Unbalanced {
            debits: total_debits,
            credits: total_credits,
        });
    }

    Ok(())
}
