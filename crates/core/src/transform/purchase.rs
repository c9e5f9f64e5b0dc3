//! Bills and vendor credits.

use rust_decimal::Decimal;

use super::item::STOCK_UOM;
use super::{Outcome, TransformContext, TransformError, tax};
use crate::document::{DocType, Document, InvoiceItem, PurchaseInvoiceDoc};
use crate::source::{EntityKind, LineDetail, PurchaseTransaction, resolve_tax_code};

/// Which QuickBooks purchase transaction a record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseFlavor {
    /// Vendor bill.
    Bill,
    /// Vendor credit, migrated as a return.
    VendorCredit,
}

impl PurchaseFlavor {
    /// Entity the record was fetched as.
    #[must_use]
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::Bill => EntityKind::Bill,
            Self::VendorCredit => EntityKind::VendorCredit,
        }
    }

    /// Whether the invoice reverses a purchase.
    #[must_use]
    pub const fn is_return(self) -> bool {
        matches!(self, Self::VendorCredit)
    }
}

/// Migrates a bill or vendor credit as a purchase invoice.
pub async fn save_purchase_invoice(
    ctx: &TransformContext<'_>,
    txn: &PurchaseTransaction,
    flavor: PurchaseFlavor,
) -> Result<Outcome, TransformError> {
    let kind = flavor.kind();
    let key = kind.key(&txn.id);
    if ctx.exists(DocType::PurchaseInvoice, &key).await? {
        return Ok(Outcome::AlreadyImported);
    }

    let supplier = ctx.lookup(DocType::Supplier, &txn.vendor_ref.value).await?;
    let payable = txn
        .ap_account_ref
        .as_ref()
        .ok_or(TransformError::MissingField {
            entity: kind.api_name(),
            field: "APAccountRef",
        })?;
    let credit_to = ctx.account_name(&payable.value).await?;
    let items = purchase_items(ctx, txn, flavor.is_return()).await?;
    let taxes = tax::tax_rows(ctx, txn.txn_tax_detail.as_ref()).await?;

    let name = ctx
        .insert(Document::PurchaseInvoice(PurchaseInvoiceDoc {
            quickbooks_id: key,
            company: ctx.company().to_string(),
            supplier: supplier.name,
            currency: txn.currency_ref.as_ref().map(|c| c.value.clone()),
            conversion_rate: txn.exchange_rate.unwrap_or(Decimal::ONE),
            posting_date: txn.txn_date,
            due_date: txn.due_date.unwrap_or(txn.txn_date),
            credit_to,
            items,
            taxes,
            is_return: flavor.is_return(),
        }))
        .await?;
    Ok(Outcome::created(name))
}

async fn purchase_items(
    ctx: &TransformContext<'_>,
    txn: &PurchaseTransaction,
    is_return: bool,
) -> Result<Vec<InvoiceItem>, TransformError> {
    let mut items = Vec::with_capacity(txn.line.len());
    for line in &txn.line {
        let mut item = match line.detail()? {
            LineDetail::ItemBasedExpense(detail) => {
                let tax_code =
                    resolve_tax_code(detail.tax_code_ref.as_ref(), txn.txn_tax_detail.as_ref());
                let stored = ctx.lookup(DocType::Item, &detail.item_ref.value).await?;
                let expense_account = match &stored.document {
                    Document::Item(item) => item.expense_account.clone(),
                    _ => None,
                };
                InvoiceItem {
                    item_code: Some(stored.name.clone()),
                    item_name: Some(stored.name),
                    description: line.description.clone(),
                    qty: detail.qty.unwrap_or(Decimal::ONE),
                    uom: STOCK_UOM.to_string(),
                    rate: detail.unit_price.unwrap_or(line.amount),
                    conversion_factor: Decimal::ONE,
                    income_account: None,
                    expense_account,
                    cost_center: ctx.settings.cost_center.clone(),
                    warehouse: ctx.settings.warehouse.clone(),
                    item_tax_rate: tax::item_tax_rate(ctx, tax_code).await?,
                    margin: None,
                }
            }
            LineDetail::AccountBasedExpense(detail) => {
                let tax_code =
                    resolve_tax_code(detail.tax_code_ref.as_ref(), txn.txn_tax_detail.as_ref());
                let account = ctx.account_name(&detail.account_ref.value).await?;
                InvoiceItem {
                    item_code: None,
                    item_name: Some(account.clone()),
                    description: Some(line.description.clone().unwrap_or_else(|| account.clone())),
                    qty: Decimal::ONE,
                    uom: STOCK_UOM.to_string(),
                    rate: line.amount,
                    conversion_factor: Decimal::ONE,
                    income_account: None,
                    expense_account: Some(account),
                    cost_center: ctx.settings.cost_center.clone(),
                    warehouse: None,
                    item_tax_rate: tax::item_tax_rate(ctx, tax_code).await?,
                    margin: None,
                }
            }
            _ => continue,
        };
        if is_return {
            item.qty = -item.qty;
        }
        items.push(item);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{Harness, date, parse};
    use super::*;
    use crate::document::DocumentStore;
    use rust_decimal_macros::dec;
    use serde_json::json;

    async fn harness() -> Harness {
        let harness = Harness::new();
        harness.seed_account("33", "Creditors - QB - AL", None, None).await;
        harness.seed_account("7", "Rent - QB - AL", None, None).await;
        harness.seed_account("80", "Cost of Sales - QB - AL", None, None).await;
        harness.seed_supplier("41", "Hicks Hardware - AL").await;
        harness
            .seed_item("5", "Rock Fountain - AL", None, Some("Cost of Sales - QB - AL"))
            .await;
        harness
    }

    fn bill() -> PurchaseTransaction {
        parse(json!({
            "Id": "25",
            "TxnDate": "2019-02-10",
            "DueDate": "2019-03-12",
            "VendorRef": {"value": "41"},
            "APAccountRef": {"value": "33"},
            "Line": [
                {
                    "Amount": 120, "DetailType": "AccountBasedExpenseLineDetail",
                    "AccountBasedExpenseLineDetail": {"AccountRef": {"value": "7"}}
                },
                {
                    "Amount": 60, "DetailType": "ItemBasedExpenseLineDetail",
                    "ItemBasedExpenseLineDetail": {
                        "ItemRef": {"value": "5"}, "Qty": 3, "UnitPrice": 20
                    }
                }
            ]
        }))
    }

    async fn stored(harness: &Harness, key: &str) -> PurchaseInvoiceDoc {
        match harness
            .store
            .find(DocType::PurchaseInvoice, key, "Acme Ltd")
            .await
            .unwrap()
            .expect("purchase invoice stored")
            .document
        {
            Document::PurchaseInvoice(doc) => doc,
            other => panic!("expected purchase invoice, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bill_becomes_purchase_invoice() {
        let harness = harness().await;
        let outcome = save_purchase_invoice(&harness.ctx(), &bill(), PurchaseFlavor::Bill)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::created("PINV-00001".into()));

        let doc = stored(&harness, "Bill - 25").await;
        assert_eq!(doc.supplier, "Hicks Hardware - AL");
        assert_eq!(doc.credit_to, "Creditors - QB - AL");
        assert_eq!(doc.due_date, date(2019, 3, 12));
        assert!(!doc.is_return);

        assert_eq!(doc.items.len(), 2);
        assert_eq!(doc.items[0].expense_account.as_deref(), Some("Rent - QB - AL"));
        assert_eq!(doc.items[0].rate, dec!(120));
        assert_eq!(doc.items[1].item_code.as_deref(), Some("Rock Fountain - AL"));
        assert_eq!(doc.items[1].qty, dec!(3));
        assert_eq!(
            doc.items[1].expense_account.as_deref(),
            Some("Cost of Sales - QB - AL")
        );
    }

    #[tokio::test]
    async fn test_vendor_credit_is_a_return() {
        let harness = harness().await;
        save_purchase_invoice(&harness.ctx(), &bill(), PurchaseFlavor::VendorCredit)
            .await
            .unwrap();

        let doc = stored(&harness, "Vendor Credit - 25").await;
        assert!(doc.is_return);
        assert_eq!(doc.items[0].qty, dec!(-1));
        assert_eq!(doc.items[1].qty, dec!(-3));
    }

    #[tokio::test]
    async fn test_missing_payable_account() {
        let harness = harness().await;
        let mut bill = bill();
        bill.ap_account_ref = None;
        let err = save_purchase_invoice(&harness.ctx(), &bill, PurchaseFlavor::Bill)
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::MissingField { field: "APAccountRef", .. }));
        assert_eq!(harness.store.count(DocType::PurchaseInvoice), 0);
    }
}
