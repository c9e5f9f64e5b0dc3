//! Wire model of the QuickBooks General Ledger report.
//!
//! The report is a tree: each account is a `Section` with an optional header
//! naming it, nested sections for sub accounts, and `Data` rows holding the
//! requested columns (`tx_date`, `txn_type`, `credit_amt`, `debt_amt`).

use serde::Deserialize;

/// Top level report document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Report {
    /// Root rows.
    #[serde(default)]
    pub rows: Rows,
}

/// Container of rows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rows {
    /// Rows in report order.
    #[serde(rename = "Row", default)]
    pub row: Vec<ReportRow>,
}

/// A report row.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ReportRow {
    /// Account section, possibly nested.
    Section(Section),
    /// Transaction line.
    Data(DataRow),
}

/// An account section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Section {
    /// Account header.
    #[serde(default)]
    pub header: Option<RowHeader>,
    /// Nested rows.
    #[serde(default)]
    pub rows: Rows,
}

/// Header of a section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RowHeader {
    /// Header cells; the first one names the account.
    #[serde(rename = "ColData", default)]
    pub col_data: Vec<ColData>,
}

/// A data row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataRow {
    /// Cells in column order.
    #[serde(rename = "ColData", default)]
    pub col_data: Vec<ColData>,
}

/// One cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ColData {
    /// Displayed value.
    #[serde(default)]
    pub value: String,
    /// Id of the entity the cell refers to.
    #[serde(default)]
    pub id: Option<String>,
}

impl Section {
    /// First header cell, if the section has a header.
    #[must_use]
    pub fn account_cell(&self) -> Option<&ColData> {
        self.header.as_ref()?.col_data.first()
    }
}

impl DataRow {
    /// Cell at `index`, if the row has that many columns.
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&ColData> {
        self.col_data.get(index)
    }
}
