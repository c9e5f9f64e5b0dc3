//! Fiscal years and extending them back to the oldest ledger date.

pub mod extend;
pub mod year;

#[cfg(test)]
mod extend_props;

pub use extend::{extend_to_cover, preceding_year};
pub use year::{FiscalError, FiscalYear, date_ranges_overlap, validate_date_range};
