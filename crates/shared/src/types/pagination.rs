//! Query windows for QuickBooks paginated reads.
//!
//! The QuickBooks query language pages with `STARTPOSITION` (1-indexed) and
//! `MAXRESULTS`. A record count obtained up front determines every window.

use serde::{Deserialize, Serialize};

/// Largest page the QuickBooks query endpoint will return.
pub const MAX_RESULTS_LIMIT: u32 = 1000;

/// One `STARTPOSITION .. MAXRESULTS` window of a paginated query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    /// Position of the first record (1-indexed).
    pub start_position: u64,
    /// Number of records requested.
    pub max_results: u32,
}

impl QueryWindow {
    /// Creates a window, clamping the page size into `1..=MAX_RESULTS_LIMIT`.
    #[must_use]
    pub fn new(start_position: u64, max_results: u32) -> Self {
        Self {
            start_position: start_position.max(1),
            max_results: max_results.clamp(1, MAX_RESULTS_LIMIT),
        }
    }

    /// Position of the last record this window can cover.
    #[must_use]
    pub fn last_position(&self) -> u64 {
        self.start_position + u64::from(self.max_results) - 1
    }

    /// Renders the paging clause of a query statement.
    #[must_use]
    pub fn clause(&self) -> String {
        format!(
            "STARTPOSITION {} MAXRESULTS {}",
            self.start_position, self.max_results
        )
    }
}

/// Splits `total` records into consecutive windows of `page_size`.
///
/// Windows start at position 1 and advance by `page_size` until every counted
/// record is covered. A total of zero yields no windows.
pub fn query_windows(total: u64, page_size: u32) -> impl Iterator<Item = QueryWindow> {
    let page_size = page_size.clamp(1, MAX_RESULTS_LIMIT);
    let step = usize::try_from(page_size).unwrap_or(1);
    (1..=total)
        .step_by(step)
        .map(move |start| QueryWindow::new(start, page_size))
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
