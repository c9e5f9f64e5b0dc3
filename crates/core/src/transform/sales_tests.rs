use super::super::fixtures::{Harness, date, parse};
use super::*;
use crate::document::{DocumentStore, SalesInvoiceDoc};
use crate::ledger::{AccountLedger, GeneralLedger, LedgerLine};
use crate::migration::ConnectorDefaults;
use crate::transform::TaxTables;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

async fn harness() -> Harness {
    let mut harness = Harness::new();
    harness.tax = TaxTables::new(
        vec![parse(json!({"Id": "1", "Name": "GST", "RateValue": 5}))],
        vec![parse(json!({
            "Id": "4", "Name": "GST",
            "SalesTaxRateList": {"TaxRateDetail": [
                {"TaxRateRef": {"value": "1"}, "TaxTypeApplicable": "TaxOnAmount"}
            ]}
        }))],
    );
    harness.defaults = ConnectorDefaults {
        undeposited_funds_account: None,
        shipping_account: Some("Shipping Income - QB - AL".into()),
    };
    harness
        .seed_account("84", "Debtors - QB - AL", Some(AccountKind::Receivable), Some("USD"))
        .await;
    harness.seed_account("35", "Checking - QB - AL", Some(AccountKind::Bank), None).await;
    harness.seed_account("79", "Sales - QB - AL", None, None).await;
    harness.seed_account("TaxRate - 1", "GST - QB - AL", None, None).await;
    harness
        .seed_customer("3", "Cool Cars - AL", Some("Debtors - QB - AL"))
        .await;
    harness
        .seed_item("5", "Rock Fountain - AL", Some("Sales - QB - AL"), None)
        .await;
    harness
}

fn sale(extra: Value) -> SalesTransaction {
    let mut value = json!({
        "Id": "130",
        "TxnDate": "2019-04-02",
        "CustomerRef": {"value": "3"},
        "TotalAmt": 550,
        "Line": [
            {
                "Amount": 500, "DetailType": "SalesItemLineDetail",
                "Description": "Rock Fountain",
                "SalesItemLineDetail": {
                    "ItemRef": {"value": "5"}, "Qty": 2, "UnitPrice": 250,
                    "TaxCodeRef": {"value": "TAX"}
                }
            },
            {"Amount": 500, "DetailType": "SubTotalLineDetail", "SubTotalLineDetail": {}}
        ],
        "TxnTaxDetail": {"TxnTaxCodeRef": {"value": "4"}, "TotalTax": 25, "TaxLine": [
            {"Amount": 25, "TaxLineDetail": {"TaxRateRef": {"value": "1"}, "TaxPercent": 5}}
        ]}
    });
    if let (Some(base), Value::Object(extra)) = (value.as_object_mut(), extra) {
        base.extend(extra);
    }
    parse(value)
}

async fn stored_invoice(harness: &Harness, key: &str) -> SalesInvoiceDoc {
    let stored = harness
        .store
        .find(DocType::SalesInvoice, key, "Acme Ltd")
        .await
        .unwrap()
        .expect("sales invoice stored");
    match stored.document {
        Document::SalesInvoice(doc) => doc,
        other => panic!("expected sales invoice, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invoice_becomes_sales_invoice() {
    let harness = harness().await;
    let outcome = save_invoice(&harness.ctx(), &sale(json!({}))).await.unwrap();
    assert_eq!(outcome, Outcome::created("SINV-00001".into()));

    let doc = stored_invoice(&harness, "Invoice - 130").await;
    assert_eq!(doc.customer, "Cool Cars - AL");
    assert_eq!(doc.debit_to.as_deref(), Some("Debtors - QB - AL"));
    assert_eq!(doc.due_date, date(2019, 4, 2));
    assert_eq!(doc.conversion_rate, Decimal::ONE);
    assert!(!doc.is_return && !doc.is_pos);

    assert_eq!(doc.items.len(), 1);
    let item = &doc.items[0];
    assert_eq!(item.item_code.as_deref(), Some("Rock Fountain - AL"));
    assert_eq!(item.qty, dec!(2));
    assert_eq!(item.rate, dec!(250));
    assert_eq!(item.income_account.as_deref(), Some("Sales - QB - AL"));
    assert_eq!(item.item_tax_rate.get("GST - QB - AL"), Some(&dec!(5)));

    assert_eq!(doc.taxes.len(), 1);
    assert_eq!(doc.taxes[0].account_head, "GST - QB - AL");
}

#[tokio::test]
async fn test_second_save_is_a_no_op() {
    let harness = harness().await;
    save_invoice(&harness.ctx(), &sale(json!({}))).await.unwrap();
    let again = save_invoice(&harness.ctx(), &sale(json!({}))).await.unwrap();
    assert_eq!(again, Outcome::AlreadyImported);
    assert_eq!(harness.store.count(DocType::SalesInvoice), 1);
}

#[tokio::test]
async fn test_credit_memo_negates_quantities() {
    let harness = harness().await;
    let memo = sale(json!({"Id": "73"}));
    save_sales_invoice(&harness.ctx(), &memo, SalesFlavor::CreditMemo)
        .await
        .unwrap();

    let doc = stored_invoice(&harness, "Credit Memo - 73").await;
    assert!(doc.is_return);
    assert_eq!(doc.items[0].qty, dec!(-2));
    assert_eq!(doc.items[0].rate, dec!(250));
}

#[tokio::test]
async fn test_refund_receipt_pays_negative_amount() {
    let harness = harness().await;
    let receipt = sale(json!({"Id": "66", "DepositToAccountRef": {"value": "35"}}));
    save_sales_invoice(&harness.ctx(), &receipt, SalesFlavor::RefundReceipt)
        .await
        .unwrap();

    let doc = stored_invoice(&harness, "Refund Receipt - 66").await;
    assert!(doc.is_pos && doc.is_return);
    assert_eq!(doc.payments.len(), 1);
    assert_eq!(doc.payments[0].account, "Checking - QB - AL");
    assert_eq!(doc.payments[0].amount, dec!(-550));
    assert_eq!(doc.payments[0].mode_of_payment, POS_MODE_OF_PAYMENT);
}

#[tokio::test]
async fn test_sales_receipt_requires_deposit_account() {
    let harness = harness().await;
    let err = save_sales_invoice(&harness.ctx(), &sale(json!({})), SalesFlavor::SalesReceipt)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TransformError::MissingField { field: "DepositToAccountRef", .. }
    ));
    assert_eq!(harness.store.count(DocType::SalesInvoice), 0);
}

#[tokio::test]
async fn test_shipping_discount_and_margin_lines() {
    let harness = harness().await;
    let invoice = sale(json!({
        "ApplyTaxAfterDiscount": true,
        "Line": [
            {
                "Amount": 100, "DetailType": "SalesItemLineDetail",
                "SalesItemLineDetail": {"ItemRef": {"value": "5"}, "TaxCodeRef": {"value": "NON"}}
            },
            {"DetailType": "DescriptionOnly", "Description": "15%"},
            {
                "Amount": 12, "DetailType": "SalesItemLineDetail",
                "SalesItemLineDetail": {"ItemRef": {"value": "SHIPPING_ITEM_ID"}}
            },
            {
                "Amount": 10, "DetailType": "DiscountLineDetail",
                "DiscountLineDetail": {"PercentBased": false}
            }
        ]
    }));
    save_invoice(&harness.ctx(), &invoice).await.unwrap();

    let doc = stored_invoice(&harness, "Invoice - 130").await;
    assert_eq!(doc.items.len(), 2);
    assert_eq!(doc.items[0].qty, Decimal::ONE);
    assert_eq!(doc.items[0].rate, dec!(100));
    assert_eq!(doc.items[0].margin, Some(dec!(15)));
    assert!(doc.items[0].item_tax_rate.is_empty());

    let shipping = &doc.items[1];
    assert_eq!(shipping.item_code, None);
    assert_eq!(shipping.rate, dec!(12));
    assert_eq!(shipping.income_account.as_deref(), Some("Shipping Income - QB - AL"));
    assert_eq!(shipping.expense_account, None);

    assert_eq!(doc.apply_discount_on, Some(DiscountBasis::NetTotal));
    assert_eq!(doc.discount_amount, Some(dec!(10)));
}

#[tokio::test]
async fn test_shipping_row_books_expense_to_tax_rate_account() {
    let harness = harness().await;
    // QuickBooks keys the shipping row's account by its tax code id.
    harness
        .seed_account("TaxRate - 4", "Shipping Tax - QB - AL", None, None)
        .await;
    let invoice = sale(json!({
        "Line": [{
            "Amount": 12, "DetailType": "SalesItemLineDetail",
            "SalesItemLineDetail": {
                "ItemRef": {"value": "SHIPPING_ITEM_ID"}, "TaxCodeRef": {"value": "4"}
            }
        }]
    }));
    save_invoice(&harness.ctx(), &invoice).await.unwrap();

    let doc = stored_invoice(&harness, "Invoice - 130").await;
    let shipping = &doc.items[0];
    assert_eq!(shipping.item_name.as_deref(), Some("Shipping"));
    assert_eq!(shipping.expense_account.as_deref(), Some("Shipping Tax - QB - AL"));
    assert_eq!(shipping.item_tax_rate.get("GST - QB - AL"), Some(&dec!(5)));
    assert_eq!(shipping.income_account.as_deref(), Some("Shipping Income - QB - AL"));
}

#[tokio::test]
async fn test_missing_customer_creates_nothing() {
    let harness = harness().await;
    let invoice = sale(json!({"CustomerRef": {"value": "999"}}));
    let err = save_invoice(&harness.ctx(), &invoice).await.unwrap_err();
    assert!(matches!(
        err,
        TransformError::MissingReference { doctype: DocType::Customer, .. }
    ));
    assert_eq!(harness.store.count(DocType::SalesInvoice), 0);
}

fn ledger_line(account: &str, debit: Decimal, credit: Decimal) -> LedgerLine {
    LedgerLine {
        account: account.into(),
        date: Some(date(2019, 4, 2)),
        txn_type: "Invoice".into(),
        txn_id: Some("130".into()),
        credit,
        debit,
    }
}

#[tokio::test]
async fn test_statement_charge_invoice_uses_ledger_entry() {
    let mut harness = harness().await;
    harness.ledger = GeneralLedger::from_accounts(vec![
        AccountLedger {
            account: "Debtors - QB - AL".into(),
            lines: vec![ledger_line("Debtors - QB - AL", dec!(80), Decimal::ZERO)],
        },
        AccountLedger {
            account: "Sales - QB - AL".into(),
            lines: vec![ledger_line("Sales - QB - AL", Decimal::ZERO, dec!(80))],
        },
    ]);
    let invoice = sale(json!({
        "LinkedTxn": [{"TxnId": "12", "TxnType": "StatementCharge"}]
    }));

    let outcome = save_invoice(&harness.ctx(), &invoice).await.unwrap();
    assert_eq!(outcome, Outcome::created("JV-00001".into()));
    assert_eq!(harness.store.count(DocType::SalesInvoice), 0);

    let journal = harness.journal("Invoice - 130").await;
    assert_eq!(journal.posting_date, date(2019, 4, 2));
    let receivable = journal.customer_line().expect("customer row");
    assert_eq!(receivable.account, "Debtors - QB - AL");
    assert_eq!(receivable.debit, dec!(80));
    assert_eq!(receivable.party.as_deref(), Some("Cool Cars - AL"));
    assert_eq!(journal.accounts[1].credit, dec!(80));
    assert_eq!(journal.accounts[1].party, None);
}

#[tokio::test]
async fn test_statement_charge_invoice_without_ledger_entry() {
    let harness = harness().await;
    let invoice = sale(json!({
        "LinkedTxn": [{"TxnId": "12", "TxnType": "ReimburseCharge"}]
    }));
    let err = save_invoice(&harness.ctx(), &invoice).await.unwrap_err();
    assert!(matches!(err, TransformError::MissingLedgerEntry { .. }));
}
