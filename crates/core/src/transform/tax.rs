//! Tax rates, tax codes and invoice tax tables.
//!
//! Each QuickBooks tax rate becomes a liability account keyed `TaxRate - {Id}`.
//! Tax codes are not migrated; together with the rates they answer three
//! questions while building invoices: the per-item tax map, whether a rate is
//! charged on the net amount, and which rate a compound rate is charged on.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use super::accounts::unique_account_name;
use super::{Outcome, TransformContext, TransformError};
use crate::document::{
    AccountDoc, ChargeType, DocType, Document, RootType, TaxRow, encode_company_abbr,
};
use crate::source::{
    EntityKind, NON_TAXABLE, TaxApplicability, TaxCode, TaxRate, TaxRateList, TxnTaxDetail,
};

/// Fetched tax rates and codes.
#[derive(Debug, Clone, Default)]
pub struct TaxTables {
    rates: HashMap<String, TaxRate>,
    codes: Vec<TaxCode>,
}

impl TaxTables {
    /// Builds the tables from fetched records.
    #[must_use]
    pub fn new(rates: Vec<TaxRate>, codes: Vec<TaxCode>) -> Self {
        Self {
            rates: rates
                .into_iter()
                .map(|rate| (rate.id.clone(), rate))
                .collect(),
            codes,
        }
    }

    /// Tax rate by id.
    #[must_use]
    pub fn rate(&self, id: &str) -> Option<&TaxRate> {
        self.rates.get(id)
    }

    /// Tax code by id.
    #[must_use]
    pub fn code(&self, id: &str) -> Option<&TaxCode> {
        self.codes.iter().find(|code| code.id == id)
    }

    fn lists(&self) -> impl Iterator<Item = &TaxRateList> {
        self.codes.iter().flat_map(TaxCode::rate_lists)
    }

    /// How the first tax code using `rate_id` applies it.
    #[must_use]
    pub fn applicability(&self, rate_id: &str) -> Option<TaxApplicability> {
        self.lists()
            .flat_map(|list| &list.tax_rate_detail)
            .find(|detail| detail.tax_rate_ref.value == rate_id)
            .map(|detail| detail.tax_type_applicable)
    }

    /// Rate that the compound rate `rate_id` is charged on.
    ///
    /// Found through `TaxOnTaxOrder`, which names the `TaxOrder` of the base
    /// rate within the same list.
    #[must_use]
    pub fn parent_rate(&self, rate_id: &str) -> Option<&str> {
        self.lists().find_map(|list| {
            let order = list
                .tax_rate_detail
                .iter()
                .find(|detail| detail.tax_rate_ref.value == rate_id)?
                .tax_on_tax_order?;
            list.tax_rate_detail
                .iter()
                .find(|detail| detail.tax_order == Some(order))
                .map(|detail| detail.tax_rate_ref.value.as_str())
        })
    }
}

/// Migrates one tax rate as a liability account.
pub async fn save_tax_rate(
    ctx: &TransformContext<'_>,
    rate: &TaxRate,
) -> Result<Outcome, TransformError> {
    let key = EntityKind::TaxRate.key(&rate.id);
    if ctx.exists(DocType::Account, &key).await? {
        return Ok(Outcome::AlreadyImported);
    }

    let (account_name, name) = unique_account_name(ctx, &rate.name).await?;
    let name = ctx
        .insert(Document::Account(AccountDoc {
            name,
            account_name,
            quickbooks_id: Some(key),
            root_type: RootType::Liability,
            account_type: None,
            account_currency: None,
            parent_account: Some(encode_company_abbr(
                &RootType::Liability.group_account_name(),
                &ctx.settings.abbr,
            )),
            is_group: false,
            company: ctx.company().to_string(),
        }))
        .await?;
    Ok(Outcome::created(name))
}

async fn rate_account(ctx: &TransformContext<'_>, rate_id: &str) -> Result<String, TransformError> {
    ctx.account_name(&EntityKind::TaxRate.key(rate_id)).await
}

/// Tax rate per tax account for an item taxed with `tax_code`.
///
/// Only rates charged on the net amount are listed; compound rates are
/// computed by the invoice tax table.
pub async fn item_tax_rate(
    ctx: &TransformContext<'_>,
    tax_code: &str,
) -> Result<BTreeMap<String, Decimal>, TransformError> {
    let mut rates = BTreeMap::new();
    if tax_code == NON_TAXABLE {
        return Ok(rates);
    }

    let code = ctx
        .tax
        .code(tax_code)
        .ok_or_else(|| TransformError::UnknownTaxCode(tax_code.to_string()))?;
    for detail in code.rate_lists().flat_map(|list| &list.tax_rate_detail) {
        if detail.tax_type_applicable != TaxApplicability::TaxOnAmount {
            continue;
        }
        let rate_id = &detail.tax_rate_ref.value;
        let rate = ctx
            .tax
            .rate(rate_id)
            .ok_or_else(|| TransformError::UnknownTaxRate(rate_id.clone()))?;
        rates.insert(
            rate_account(ctx, rate_id).await?,
            rate.rate_value.unwrap_or_default(),
        );
    }
    Ok(rates)
}

/// Invoice tax table for a transaction's tax lines.
///
/// A rate charged on the net amount gets `On Net Total` with rate zero, since
/// the per-item tax map carries the actual rate. Any other rate is charged on
/// the row of its base rate with the line's `TaxPercent`. A rate that no tax
/// code mentions has no known applicability and is charged the same way,
/// without a base row, so its percentage is kept on the document.
pub async fn tax_rows(
    ctx: &TransformContext<'_>,
    detail: Option<&TxnTaxDetail>,
) -> Result<Vec<TaxRow>, TransformError> {
    let mut rows: Vec<TaxRow> = Vec::new();
    let Some(detail) = detail else {
        return Ok(rows);
    };

    for line in &detail.tax_line {
        let rate_id = &line.tax_line_detail.tax_rate_ref.value;
        let account_head = rate_account(ctx, rate_id).await?;
        let row = match ctx.tax.applicability(rate_id) {
            Some(TaxApplicability::TaxOnAmount) => TaxRow {
                charge_type: ChargeType::OnNetTotal,
                row_id: None,
                description: account_head.clone(),
                account_head,
                cost_center: ctx.settings.cost_center.clone(),
                rate: Decimal::ZERO,
            },
            _ => {
                let row_id = match ctx.tax.parent_rate(rate_id) {
                    Some(parent) => {
                        let parent_head = rate_account(ctx, parent).await?;
                        rows.iter()
                            .position(|row| row.account_head == parent_head)
                            .map(|index| index + 1)
                    }
                    None => None,
                };
                TaxRow {
                    charge_type: ChargeType::OnPreviousRowAmount,
                    row_id,
                    description: account_head.clone(),
                    account_head,
                    cost_center: ctx.settings.cost_center.clone(),
                    rate: line.tax_line_detail.tax_percent.unwrap_or_default(),
                }
            }
        };
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{Harness, parse};
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn tables() -> TaxTables {
        let rates = vec![
            parse(json!({"Id": "1", "Name": "GST", "RateValue": 5})),
            parse(json!({"Id": "2", "Name": "PST", "RateValue": 7})),
            parse(json!({"Id": "3", "Name": "QST", "RateValue": "9.975"})),
            parse(json!({"Id": "6", "Name": "Levy", "RateValue": 2})),
        ];
        let codes = vec![
            parse(json!({
                "Id": "4", "Name": "GST/PST",
                "SalesTaxRateList": {"TaxRateDetail": [
                    {"TaxRateRef": {"value": "1"}, "TaxTypeApplicable": "TaxOnAmount", "TaxOrder": 0},
                    {"TaxRateRef": {"value": "2"}, "TaxTypeApplicable": "TaxOnAmount", "TaxOrder": 0}
                ]}
            })),
            parse(json!({
                "Id": "5", "Name": "GST/QST",
                "SalesTaxRateList": {"TaxRateDetail": [
                    {"TaxRateRef": {"value": "1"}, "TaxTypeApplicable": "TaxOnAmount", "TaxOrder": 1},
                    {"TaxRateRef": {"value": "3"}, "TaxTypeApplicable": "TaxOnTax",
                     "TaxOrder": 2, "TaxOnTaxOrder": 1}
                ]}
            })),
        ];
        TaxTables::new(rates, codes)
    }

    async fn harness() -> Harness {
        let mut harness = Harness::new();
        harness.tax = tables();
        harness.seed_account("TaxRate - 1", "GST - QB - AL", None, None).await;
        harness.seed_account("TaxRate - 2", "PST - QB - AL", None, None).await;
        harness.seed_account("TaxRate - 3", "QST - QB - AL", None, None).await;
        harness.seed_account("TaxRate - 6", "Levy - QB - AL", None, None).await;
        harness
    }

    #[test]
    fn test_parent_rate_follows_tax_order() {
        let tables = tables();
        assert_eq!(tables.parent_rate("3"), Some("1"));
        assert_eq!(tables.parent_rate("1"), None);
        assert_eq!(tables.applicability("3"), Some(TaxApplicability::TaxOnTax));
        assert_eq!(tables.applicability("99"), None);
    }

    #[tokio::test]
    async fn test_tax_rate_becomes_liability_account() {
        let harness = Harness::new();
        let rate: TaxRate = parse(json!({"Id": "8", "Name": "VAT", "RateValue": 20}));

        let outcome = save_tax_rate(&harness.ctx(), &rate).await.unwrap();
        assert_eq!(outcome, Outcome::created("VAT - QB - AL".into()));
        assert_eq!(
            save_tax_rate(&harness.ctx(), &rate).await.unwrap(),
            Outcome::AlreadyImported
        );
    }

    #[tokio::test]
    async fn test_item_tax_rate_lists_net_rates() {
        let harness = harness().await;
        let rates = item_tax_rate(&harness.ctx(), "4").await.unwrap();
        assert_eq!(rates.get("GST - QB - AL"), Some(&dec!(5)));
        assert_eq!(rates.get("PST - QB - AL"), Some(&dec!(7)));

        let compound = item_tax_rate(&harness.ctx(), "5").await.unwrap();
        assert_eq!(compound.len(), 1);
    }

    #[tokio::test]
    async fn test_item_tax_rate_non_taxable_and_unknown() {
        let harness = harness().await;
        assert!(item_tax_rate(&harness.ctx(), NON_TAXABLE).await.unwrap().is_empty());
        let err = item_tax_rate(&harness.ctx(), "77").await.unwrap_err();
        assert!(matches!(err, TransformError::UnknownTaxCode(code) if code == "77"));
    }

    #[tokio::test]
    async fn test_compound_rate_points_at_base_row() {
        let harness = harness().await;
        let detail: TxnTaxDetail = parse(json!({
            "TxnTaxCodeRef": {"value": "5"},
            "TaxLine": [
                {"Amount": 5, "TaxLineDetail": {"TaxRateRef": {"value": "1"}, "TaxPercent": 5}},
                {"Amount": "10.47", "TaxLineDetail": {"TaxRateRef": {"value": "3"}, "TaxPercent": "9.975"}}
            ]
        }));

        let rows = tax_rows(&harness.ctx(), Some(&detail)).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].charge_type, ChargeType::OnNetTotal);
        assert_eq!(rows[0].rate, Decimal::ZERO);
        assert_eq!(rows[1].charge_type, ChargeType::OnPreviousRowAmount);
        assert_eq!(rows[1].row_id, Some(1));
        assert_eq!(rows[1].rate, dec!(9.975));
        assert_eq!(rows[1].account_head, "QST - QB - AL");
    }

    #[tokio::test]
    async fn test_rate_outside_every_code_keeps_its_percentage() {
        let harness = harness().await;
        let detail: TxnTaxDetail = parse(json!({
            "TaxLine": [
                {"Amount": 2, "TaxLineDetail": {"TaxRateRef": {"value": "6"}, "TaxPercent": 2}}
            ]
        }));

        let rows = tax_rows(&harness.ctx(), Some(&detail)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].charge_type, ChargeType::OnPreviousRowAmount);
        assert_eq!(rows[0].row_id, None);
        assert_eq!(rows[0].rate, dec!(2));
        assert_eq!(rows[0].account_head, "Levy - QB - AL");
    }

    #[tokio::test]
    async fn test_no_tax_detail_means_no_rows() {
        let harness = harness().await;
        assert!(tax_rows(&harness.ctx(), None).await.unwrap().is_empty());
    }
}
