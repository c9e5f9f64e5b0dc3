//! Transactional QuickBooks entities.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Line, LinkedTxn, Reference, TxnTaxDetail};

/// Link types whose lines QuickBooks does not expose; invoices linked to them
/// are rebuilt from the General Ledger instead.
pub const GL_ONLY_LINK_TYPES: [&str; 2] = ["StatementCharge", "ReimburseCharge"];

/// Invoice, credit memo, sales receipt or refund receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalesTransaction {
    /// QuickBooks id.
    pub id: String,
    /// Transaction date.
    pub txn_date: NaiveDate,
    /// Due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Transaction currency.
    #[serde(default)]
    pub currency_ref: Option<Reference>,
    /// Rate to the home currency; absent without multicurrency.
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
    /// Customer billed.
    pub customer_ref: Reference,
    /// Lines.
    #[serde(default)]
    pub line: Vec<Line>,
    /// Computed tax.
    #[serde(default)]
    pub txn_tax_detail: Option<TxnTaxDetail>,
    /// Linked transactions.
    #[serde(default)]
    pub linked_txn: Vec<LinkedTxn>,
    /// Whether the discount is taken before tax.
    #[serde(default)]
    pub apply_tax_after_discount: bool,
    /// Total amount.
    #[serde(default)]
    pub total_amt: Decimal,
    /// Account receipts are deposited to.
    #[serde(default)]
    pub deposit_to_account_ref: Option<Reference>,
}

impl SalesTransaction {
    /// Whether the invoice draws its lines from a charge the API hides.
    #[must_use]
    pub fn is_linked_to_gl_only_charge(&self) -> bool {
        self.linked_txn
            .iter()
            .any(|link| GL_ONLY_LINK_TYPES.contains(&link.txn_type.as_str()))
    }
}

/// Bill or vendor credit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PurchaseTransaction {
    /// QuickBooks id.
    pub id: String,
    /// Transaction date.
    pub txn_date: NaiveDate,
    /// Due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Transaction currency.
    #[serde(default)]
    pub currency_ref: Option<Reference>,
    /// Rate to the home currency.
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
    /// Vendor billing.
    pub vendor_ref: Reference,
    /// Payable account.
    #[serde(rename = "APAccountRef", default)]
    pub ap_account_ref: Option<Reference>,
    /// Lines.
    #[serde(default)]
    pub line: Vec<Line>,
    /// Computed tax.
    #[serde(default)]
    pub txn_tax_detail: Option<TxnTaxDetail>,
}

/// Manual journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JournalEntry {
    /// QuickBooks id.
    pub id: String,
    /// Transaction date.
    pub txn_date: NaiveDate,
    /// Lines.
    #[serde(default)]
    pub line: Vec<Line>,
}

/// Customer payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Payment {
    /// QuickBooks id.
    pub id: String,
    /// Transaction date.
    pub txn_date: NaiveDate,
    /// Amount received.
    #[serde(default)]
    pub total_amt: Decimal,
    /// Customer paying.
    #[serde(default)]
    pub customer_ref: Option<Reference>,
    /// Account the payment is deposited to. Absent for payments recorded
    /// by QuickBooks Payments, which touch no account.
    #[serde(default)]
    pub deposit_to_account_ref: Option<Reference>,
    /// Lines, each linked to the settled transaction.
    #[serde(default)]
    pub line: Vec<Line>,
}

/// How a bill payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillPayType {
    /// Paid by check from a bank account.
    Check,
    /// Charged to a credit card.
    CreditCard,
}

/// Check details of a bill payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CheckPayment {
    /// Bank account paid from.
    pub bank_account_ref: Reference,
}

/// Credit card details of a bill payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCardPayment {
    /// Credit card account charged.
    #[serde(rename = "CCAccountRef")]
    pub cc_account_ref: Reference,
}

/// Vendor bill payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BillPayment {
    /// QuickBooks id.
    pub id: String,
    /// Transaction date.
    pub txn_date: NaiveDate,
    /// Amount paid.
    #[serde(default)]
    pub total_amt: Decimal,
    /// Payment method.
    pub pay_type: BillPayType,
    /// Set for check payments.
    #[serde(default)]
    pub check_payment: Option<CheckPayment>,
    /// Set for credit card payments.
    #[serde(default)]
    pub credit_card_payment: Option<CreditCardPayment>,
    /// Lines, each linked to the settled bill.
    #[serde(default)]
    pub line: Vec<Line>,
}

impl BillPayment {
    /// Account the payment leaves from.
    #[must_use]
    pub fn paying_account(&self) -> Option<&Reference> {
        match self.pay_type {
            BillPayType::Check => self.check_payment.as_ref().map(|p| &p.bank_account_ref),
            BillPayType::CreditCard => self.credit_card_payment.as_ref().map(|p| &p.cc_account_ref),
        }
    }
}

/// Expense, check or credit card charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Purchase {
    /// QuickBooks id.
    pub id: String,
    /// Transaction date.
    pub txn_date: NaiveDate,
    /// Paying account.
    pub account_ref: Reference,
    /// Total amount.
    #[serde(default)]
    pub total_amt: Decimal,
    /// Lines.
    #[serde(default)]
    pub line: Vec<Line>,
    /// Computed tax.
    #[serde(default)]
    pub txn_tax_detail: Option<TxnTaxDetail>,
    /// Set on refunds; every side flips.
    #[serde(default)]
    pub credit: Option<bool>,
}

/// Cash kept back from a deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CashBack {
    /// Account the cash back is booked to.
    pub account_ref: Reference,
    /// Amount kept.
    #[serde(default)]
    pub amount: Decimal,
}

/// Bank deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Deposit {
    /// QuickBooks id.
    pub id: String,
    /// Transaction date.
    pub txn_date: NaiveDate,
    /// Bank account deposited to.
    pub deposit_to_account_ref: Reference,
    /// Amount deposited.
    #[serde(default)]
    pub total_amt: Decimal,
    /// Lines.
    #[serde(default)]
    pub line: Vec<Line>,
    /// Cash kept back.
    #[serde(default)]
    pub cash_back: Option<CashBack>,
}

/// Sales form preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalesFormsPrefs {
    /// Whether shipping charges are enabled.
    #[serde(default)]
    pub allow_shipping: Option<bool>,
    /// Account shipping income is booked to. QuickBooks sends `false` when
    /// none is set.
    #[serde(default)]
    pub default_shipping_account: Option<serde_json::Value>,
}

/// Company preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Preferences {
    /// Sales form preferences.
    #[serde(default)]
    pub sales_forms_prefs: Option<SalesFormsPrefs>,
}

impl Preferences {
    /// Id of the shipping income account, when shipping is enabled.
    #[must_use]
    pub fn shipping_account_id(&self) -> Option<&str> {
        let prefs = self.sales_forms_prefs.as_ref()?;
        if prefs.allow_shipping != Some(true) {
            return None;
        }
        prefs.default_shipping_account.as_ref()?.as_str()
    }
}
