//! Prepends fiscal years until the oldest ledger date is covered.

use chrono::{Days, Months, NaiveDate};

use super::year::{FiscalError, FiscalYear};

/// The year ending the day before `year` starts and starting twelve months
/// earlier.
///
/// Month arithmetic clamps to the end of the month, so a year starting on
/// 29 February 2024 is preceded by one starting on 28 February 2023.
///
/// # Errors
///
/// Returns [`FiscalError::OutOfRange`] when the dates leave chrono's range.
pub fn preceding_year(year: &FiscalYear) -> Result<FiscalYear, FiscalError> {
    let out_of_range = || FiscalError::OutOfRange(year.start_date);
    let start_date = year
        .start_date
        .checked_sub_months(Months::new(12))
        .ok_or_else(out_of_range)?;
    let end_date = year
        .start_date
        .checked_sub_days(Days::new(1))
        .ok_or_else(out_of_range)?;
    FiscalYear::new(start_date, end_date)
}

/// Years to create so that `target` falls inside a fiscal year, newest first.
///
/// Returns nothing when `target` is on or after `oldest.start_date`. The new
/// years are contiguous with `oldest` and with each other.
///
/// # Errors
///
/// Returns [`FiscalError::OutOfRange`] when the dates leave chrono's range.
pub fn extend_to_cover(
    oldest: &FiscalYear,
    target: NaiveDate,
) -> Result<Vec<FiscalYear>, FiscalError> {
    let mut created = Vec::new();
    let mut current = oldest.clone();
    while target < current.start_date {
        let previous = preceding_year(&current)?;
        created.push(previous.clone());
        current = previous;
    }
    Ok(created)
}
