//! General Ledger reconstruction and journal synthesis.
//!
//! This module implements the ledger side of the migration:
//! - Wire model of the General Ledger report
//! - Reconstruction of per-transaction entries from the report
//! - Journal entry synthesis for transactions only the ledger knows
//! - Balance validation shared by every journal entry

pub mod entry;
pub mod reconstruct;
pub mod report;
pub mod synth;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use entry::{AccountLedger, GeneralLedger, LedgerEntry, LedgerLine};
pub use reconstruct::{AccountIndex, NOT_SPECIFIED, ReconstructError, reconstruct};
pub use report::Report;
pub use synth::{SynthError, journal_lines, synthesize_journal_entry};
pub use validation::{LedgerValidationError, Posting, validate_postings};
