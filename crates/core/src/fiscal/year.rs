//! Fiscal year type and date range rules.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for fiscal year operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FiscalError {
    /// Start date must be before end date.
    #[error("Start date must be before end date")]
    InvalidDateRange,

    /// Fiscal year overlaps with existing year.
    #[error("Fiscal year overlaps with existing year: {0}")]
    OverlappingYear(String),

    /// Date arithmetic left the supported calendar.
    #[error("Fiscal year before {0} is out of range")]
    OutOfRange(NaiveDate),
}

impl FiscalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
            Self::OverlappingYear(_) => "OVERLAPPING_YEAR",
            Self::OutOfRange(_) => "DATE_OUT_OF_RANGE",
        }
    }
}

/// A fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYear {
    /// Label: `"2019"` for a calendar year, `"2018-2019"` otherwise.
    pub year: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
}

impl FiscalYear {
    /// Creates a fiscal year labelled from its dates.
    ///
    /// # Errors
    ///
    /// Returns [`FiscalError::InvalidDateRange`] unless `start_date < end_date`.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, FiscalError> {
        validate_date_range(start_date, end_date)?;
        Ok(Self {
            year: year_label(start_date, end_date),
            start_date,
            end_date,
        })
    }

    /// Whether `date` falls inside this year.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Whether the two years share at least one day.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        date_ranges_overlap(self.start_date, self.end_date, other.start_date, other.end_date)
    }
}

fn year_label(start_date: NaiveDate, end_date: NaiveDate) -> String {
    if start_date.year() == end_date.year() {
        start_date.year().to_string()
    } else {
        format!("{}-{}", start_date.year(), end_date.year())
    }
}

/// Validates that start_date is strictly before end_date.
///
/// # Errors
///
/// Returns [`FiscalError::InvalidDateRange`] otherwise.
pub fn validate_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), FiscalError> {
    if start_date >= end_date {
        return Err(FiscalError::InvalidDateRange);
    }
    Ok(())
}

/// Checks if two date ranges overlap.
///
/// Two ranges [a_start, a_end] and [b_start, b_end] overlap if:
/// a_start <= b_end AND a_end >= b_start
#[must_use]
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}
