//! Tax rates, tax codes and transaction tax details.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Reference;

/// Tax code sentinel meaning "not taxable".
pub const NON_TAXABLE: &str = "NON";

/// Line tax code meaning "use the transaction's tax code".
pub const TRANSACTION_TAX: &str = "TAX";

/// A single tax rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxRate {
    /// QuickBooks id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Rate in percent.
    #[serde(default)]
    pub rate_value: Option<Decimal>,
}

/// How a tax rate inside a tax code is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxApplicability {
    /// Flat rate on the net amount.
    TaxOnAmount,
    /// Rate applied to the amount plus a previously computed tax.
    TaxOnAmountPlusTax,
    /// Rate applied to another tax.
    TaxOnTax,
    /// Anything newer QuickBooks may send; treated like tax on tax.
    #[serde(other)]
    Other,
}

/// One rate of a tax code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxRateDetail {
    /// Rate this detail applies.
    pub tax_rate_ref: Reference,
    /// Computation basis.
    pub tax_type_applicable: TaxApplicability,
    /// Position of this detail inside its list.
    #[serde(default)]
    pub tax_order: Option<i32>,
    /// `tax_order` of the detail this one is computed on.
    #[serde(default)]
    pub tax_on_tax_order: Option<i32>,
}

/// Ordered rates of one side (sales or purchase) of a tax code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxRateList {
    /// Rate details.
    #[serde(default)]
    pub tax_rate_detail: Vec<TaxRateDetail>,
}

/// A tax code grouping sales and purchase tax rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxCode {
    /// QuickBooks id.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Rates charged on sales.
    #[serde(default)]
    pub sales_tax_rate_list: Option<TaxRateList>,
    /// Rates charged on purchases.
    #[serde(default)]
    pub purchase_tax_rate_list: Option<TaxRateList>,
}

impl TaxCode {
    /// Sales then purchase rate lists, skipping absent ones.
    pub fn rate_lists(&self) -> impl Iterator<Item = &TaxRateList> {
        self.sales_tax_rate_list
            .iter()
            .chain(self.purchase_tax_rate_list.iter())
    }
}

/// Tax computed on a transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TxnTaxDetail {
    /// Tax code for lines marked `TAX`.
    #[serde(default)]
    pub txn_tax_code_ref: Option<Reference>,
    /// Total tax.
    #[serde(default)]
    pub total_tax: Option<Decimal>,
    /// Tax charged per rate.
    #[serde(default)]
    pub tax_line: Vec<TaxLine>,
}

/// Tax charged for one rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxLine {
    /// Tax amount.
    #[serde(default)]
    pub amount: Decimal,
    /// Rate details.
    pub tax_line_detail: TaxLineDetail,
}

/// Rate details of a [`TaxLine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxLineDetail {
    /// Rate charged.
    pub tax_rate_ref: Reference,
    /// Rate in percent.
    #[serde(default)]
    pub tax_percent: Option<Decimal>,
}

/// Resolves the tax code that applies to a line.
///
/// A line code other than `TAX` wins; `TAX` defers to the transaction's code;
/// without either the line is not taxable.
#[must_use]
pub fn resolve_tax_code<'a>(
    line_code: Option<&'a Reference>,
    txn_tax: Option<&'a TxnTaxDetail>,
) -> &'a str {
    match line_code {
        Some(code) if code.value != TRANSACTION_TAX => &code.value,
        _ => txn_tax
            .and_then(|detail| detail.txn_tax_code_ref.as_ref())
            .map_or(NON_TAXABLE, |code| code.value.as_str()),
    }
}
