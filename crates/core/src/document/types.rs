//! Document payloads.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DocType;
use crate::ledger::Posting;

/// Root of the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootType {
    /// Assets.
    Asset,
    /// Liabilities.
    Liability,
    /// Equity.
    Equity,
    /// Income.
    Income,
    /// Expenses.
    Expense,
}

impl RootType {
    /// Creation order of the root group accounts.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Equity,
        Self::Expense,
        Self::Liability,
        Self::Income,
    ];

    /// Display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "Asset",
            Self::Liability => "Liability",
            Self::Equity => "Equity",
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }

    /// Name of the group account migrated accounts of this root hang under,
    /// before company encoding.
    #[must_use]
    pub fn group_account_name(self) -> String {
        format!("{} - QB", self.as_str())
    }
}

/// Special role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    /// Bank or credit card.
    Bank,
    /// Cash, including undeposited funds.
    Cash,
    /// Trade payables.
    Payable,
    /// Trade receivables.
    Receivable,
}

/// A ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDoc {
    /// Unique name, company encoded.
    pub name: String,
    /// Name without the company suffix.
    pub account_name: String,
    /// Source key; `None` for the root groups.
    pub quickbooks_id: Option<String>,
    /// Root type.
    pub root_type: RootType,
    /// Special role.
    pub account_type: Option<AccountKind>,
    /// Account currency.
    pub account_currency: Option<String>,
    /// Parent group account name.
    pub parent_account: Option<String>,
    /// Whether other accounts hang under this one.
    pub is_group: bool,
    /// Owning company.
    pub company: String,
}

/// A customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDoc {
    /// Customer name, company encoded.
    pub name: String,
    /// Source key.
    pub quickbooks_id: String,
    /// Always `Individual`.
    pub customer_type: String,
    /// Customer group.
    pub customer_group: String,
    /// Territory.
    pub territory: String,
    /// Billing currency.
    pub default_currency: Option<String>,
    /// Receivable account used for this customer's invoices.
    pub receivable_account: Option<String>,
    /// Owning company.
    pub company: String,
}

/// A supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierDoc {
    /// Supplier name, company encoded.
    pub name: String,
    /// Source key.
    pub quickbooks_id: String,
    /// Supplier group.
    pub supplier_group: String,
    /// Owning company.
    pub company: String,
}

/// Billing or shipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressType {
    /// Billing address.
    Billing,
    /// Shipping address.
    Shipping,
}

impl AddressType {
    /// Display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Billing => "Billing",
            Self::Shipping => "Shipping",
        }
    }
}

/// Link from an address to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicLink {
    /// Owner document type.
    pub link_doctype: DocType,
    /// Owner document name.
    pub link_name: String,
}

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressDoc {
    /// `"{title}-{type}"`.
    pub name: String,
    /// Source key: the QuickBooks address id.
    pub quickbooks_id: String,
    /// Owner name.
    pub address_title: String,
    /// Billing or shipping.
    pub address_type: AddressType,
    /// First street line.
    pub address_line1: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Owners.
    pub links: Vec<DynamicLink>,
    /// Owning company.
    pub company: String,
}

/// An item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDoc {
    /// Item code, company encoded.
    pub name: String,
    /// Source key.
    pub quickbooks_id: String,
    /// Item group.
    pub item_group: String,
    /// Stock unit of measure.
    pub stock_uom: String,
    /// Whether stock is tracked.
    pub is_stock_item: bool,
    /// Default warehouse.
    pub default_warehouse: Option<String>,
    /// Default income account.
    pub income_account: Option<String>,
    /// Default expense account.
    pub expense_account: Option<String>,
    /// Owning company.
    pub company: String,
}

/// Party on a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyType {
    /// Customer.
    Customer,
    /// Supplier.
    Supplier,
}

/// One journal entry row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Account posted to.
    pub account: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Cost center.
    pub cost_center: String,
    /// Party type, for receivable and payable rows.
    pub party_type: Option<PartyType>,
    /// Party name.
    pub party: Option<String>,
    /// Type of the settled document.
    pub reference_type: Option<DocType>,
    /// Name of the settled document.
    pub reference_name: Option<String>,
}

impl JournalLine {
    /// Creates a row without party or reference.
    #[must_use]
    pub fn new(
        account: impl Into<String>,
        debit: Decimal,
        credit: Decimal,
        cost_center: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            debit,
            credit,
            cost_center: cost_center.into(),
            party_type: None,
            party: None,
            reference_type: None,
            reference_name: None,
        }
    }

    /// Moves the amount to the other side.
    #[must_use]
    pub fn swapped(self) -> Self {
        Self {
            debit: self.credit,
            credit: self.debit,
            ..self
        }
    }

    /// Attaches a party.
    #[must_use]
    pub fn with_party(mut self, party_type: PartyType, party: impl Into<String>) -> Self {
        self.party_type = Some(party_type);
        self.party = Some(party.into());
        self
    }

    /// Attaches the settled document.
    #[must_use]
    pub fn with_reference(mut self, doctype: DocType, name: impl Into<String>) -> Self {
        self.reference_type = Some(doctype);
        self.reference_name = Some(name.into());
        self
    }
}

impl Posting for JournalLine {
    fn debit(&self) -> Decimal {
        self.debit
    }

    fn credit(&self) -> Decimal {
        self.credit
    }
}

/// A journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryDoc {
    /// Source key.
    pub quickbooks_id: String,
    /// Owning company.
    pub company: String,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Rows.
    pub accounts: Vec<JournalLine>,
}

impl JournalEntryDoc {
    /// First row carrying a customer, if any.
    #[must_use]
    pub fn customer_line(&self) -> Option<&JournalLine> {
        self.accounts
            .iter()
            .find(|line| line.party_type == Some(PartyType::Customer))
    }
}

/// One invoice item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// Item, when the line refers to one.
    pub item_code: Option<String>,
    /// Free item name, for account based and shipping lines.
    pub item_name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Quantity; negative on returns.
    pub qty: Decimal,
    /// Unit of measure.
    pub uom: String,
    /// Price per unit.
    pub rate: Decimal,
    /// Always one.
    pub conversion_factor: Decimal,
    /// Income account override.
    pub income_account: Option<String>,
    /// Expense account override.
    pub expense_account: Option<String>,
    /// Cost center.
    pub cost_center: String,
    /// Warehouse.
    pub warehouse: Option<String>,
    /// Flat tax rates by tax account.
    pub item_tax_rate: BTreeMap<String, Decimal>,
    /// Percentage margin over the rate.
    pub margin: Option<Decimal>,
}

/// How a tax row is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeType {
    /// Per item rates on the net total.
    #[serde(rename = "On Net Total")]
    OnNetTotal,
    /// Rate on the amount of an earlier row.
    #[serde(rename = "On Previous Row Amount")]
    OnPreviousRowAmount,
}

/// One row of an invoice's tax table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRow {
    /// Computation basis.
    pub charge_type: ChargeType,
    /// 1-based row this row is computed on.
    pub row_id: Option<usize>,
    /// Tax account.
    pub account_head: String,
    /// Description.
    pub description: String,
    /// Cost center.
    pub cost_center: String,
    /// Rate; zero for net total rows, which take per item rates.
    pub rate: Decimal,
}

/// Which total a discount applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountBasis {
    /// Before tax.
    #[serde(rename = "Net Total")]
    NetTotal,
    /// After tax.
    #[serde(rename = "Grand Total")]
    GrandTotal,
}

/// Payment recorded on a point of sale invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosPayment {
    /// Always `Cash`.
    pub mode_of_payment: String,
    /// Account receiving the payment.
    pub account: String,
    /// Amount; negative on returns.
    pub amount: Decimal,
}

/// A sales invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesInvoiceDoc {
    /// Source key.
    pub quickbooks_id: String,
    /// Owning company.
    pub company: String,
    /// Customer name.
    pub customer: String,
    /// Invoice currency.
    pub currency: Option<String>,
    /// Rate to the company currency.
    pub conversion_rate: Decimal,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Receivable account.
    pub debit_to: Option<String>,
    /// Items.
    pub items: Vec<InvoiceItem>,
    /// Taxes.
    pub taxes: Vec<TaxRow>,
    /// Credit note.
    pub is_return: bool,
    /// Point of sale invoice.
    pub is_pos: bool,
    /// Payments, for point of sale invoices.
    pub payments: Vec<PosPayment>,
    /// Discount basis.
    pub apply_discount_on: Option<DiscountBasis>,
    /// Discount amount.
    pub discount_amount: Option<Decimal>,
}

/// A purchase invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseInvoiceDoc {
    /// Source key.
    pub quickbooks_id: String,
    /// Owning company.
    pub company: String,
    /// Supplier name.
    pub supplier: String,
    /// Invoice currency.
    pub currency: Option<String>,
    /// Rate to the company currency.
    pub conversion_rate: Decimal,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Payable account.
    pub credit_to: String,
    /// Items.
    pub items: Vec<InvoiceItem>,
    /// Taxes.
    pub taxes: Vec<TaxRow>,
    /// Debit note.
    pub is_return: bool,
}
