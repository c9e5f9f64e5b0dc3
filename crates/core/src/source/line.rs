//! Transaction lines.
//!
//! QuickBooks sends every line with a `DetailType` discriminator and one
//! detail object named after it. [`Line`] keeps that wire shape;
//! [`Line::detail`] checks the pair and hands out a [`LineDetail`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Reference, SourceError};

/// Pseudo item id QuickBooks uses for shipping charges.
pub const SHIPPING_ITEM_ID: &str = "SHIPPING_ITEM_ID";

/// Debit or credit side of a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostingType {
    /// Debit side.
    Debit,
    /// Credit side.
    Credit,
}

/// Link from a line or transaction to another transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinkedTxn {
    /// Id of the linked transaction.
    pub txn_id: String,
    /// Type of the linked transaction, e.g. `Invoice` or `StatementCharge`.
    pub txn_type: String,
}

/// Sold product or service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalesItemLineDetail {
    /// Item sold, or [`SHIPPING_ITEM_ID`].
    pub item_ref: Reference,
    /// Quantity.
    #[serde(default)]
    pub qty: Option<Decimal>,
    /// Price per unit.
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    /// Tax code applied to the line (`TAX` defers to the transaction).
    #[serde(default)]
    pub tax_code_ref: Option<Reference>,
}

/// Purchased item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemBasedExpenseLineDetail {
    /// Item bought.
    pub item_ref: Reference,
    /// Quantity.
    #[serde(default)]
    pub qty: Option<Decimal>,
    /// Price per unit.
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    /// Tax code applied to the line.
    #[serde(default)]
    pub tax_code_ref: Option<Reference>,
}

/// Expense booked straight to an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountBasedExpenseLineDetail {
    /// Expense account.
    pub account_ref: Reference,
    /// Tax code applied to the line.
    #[serde(default)]
    pub tax_code_ref: Option<Reference>,
}

/// One side of a manual journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JournalEntryLineDetail {
    /// Debit or credit.
    pub posting_type: PostingType,
    /// Account posted to.
    pub account_ref: Reference,
}

/// Transaction level discount.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiscountLineDetail {
    /// Whether the discount was entered as a percentage.
    #[serde(default)]
    pub percent_based: Option<bool>,
    /// Percentage, when percent based.
    #[serde(default)]
    pub discount_percent: Option<Decimal>,
}

/// Deposit line not linked to an earlier payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DepositLineDetail {
    /// Account the deposited amount comes from.
    #[serde(default)]
    pub account_ref: Option<Reference>,
}

/// A raw transaction line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Line {
    /// Line id, unique within the transaction.
    #[serde(default)]
    pub id: Option<String>,
    /// Line amount.
    #[serde(default)]
    pub amount: Decimal,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
    /// Discriminator naming the detail object. Payment lines carry none.
    #[serde(default)]
    pub detail_type: String,
    /// Transactions this line settles or draws from.
    #[serde(default)]
    pub linked_txn: Vec<LinkedTxn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sales_item_line_detail: Option<SalesItemLineDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    item_based_expense_line_detail: Option<ItemBasedExpenseLineDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account_based_expense_line_detail: Option<AccountBasedExpenseLineDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    journal_entry_line_detail: Option<JournalEntryLineDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    discount_line_detail: Option<DiscountLineDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deposit_line_detail: Option<DepositLineDetail>,
}

/// Typed view of a line's detail.
#[derive(Debug, Clone, Copy)]
pub enum LineDetail<'a> {
    /// Sold item.
    SalesItem(&'a SalesItemLineDetail),
    /// Purchased item.
    ItemBasedExpense(&'a ItemBasedExpenseLineDetail),
    /// Expense account.
    AccountBasedExpense(&'a AccountBasedExpenseLineDetail),
    /// Journal entry side.
    JournalEntry(&'a JournalEntryLineDetail),
    /// Discount.
    Discount(&'a DiscountLineDetail),
    /// Deposit from an account.
    Deposit(&'a DepositLineDetail),
    /// Text only line; may carry a margin such as `"15%"`.
    DescriptionOnly,
    /// Sub total, ignored by every transformer.
    SubTotal,
    /// Any other detail type, carried by name.
    Other(&'a str),
}

impl Line {
    /// Checks the `DetailType` discriminator against the detail objects.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingField`] if the discriminator names a
    /// detail the line does not carry.
    pub fn detail(&self) -> Result<LineDetail<'_>, SourceError> {
        fn present<'a, T>(
            detail: Option<&'a T>,
            field: &'static str,
        ) -> Result<&'a T, SourceError> {
            detail.ok_or(SourceError::MissingField {
                entity: "Line",
                field,
            })
        }

        Ok(match self.detail_type.as_str() {
            "SalesItemLineDetail" => LineDetail::SalesItem(present(
                self.sales_item_line_detail.as_ref(),
                "SalesItemLineDetail",
            )?),
            "ItemBasedExpenseLineDetail" => LineDetail::ItemBasedExpense(present(
                self.item_based_expense_line_detail.as_ref(),
                "ItemBasedExpenseLineDetail",
            )?),
            "AccountBasedExpenseLineDetail" => LineDetail::AccountBasedExpense(present(
                self.account_based_expense_line_detail.as_ref(),
                "AccountBasedExpenseLineDetail",
            )?),
            "JournalEntryLineDetail" => LineDetail::JournalEntry(present(
                self.journal_entry_line_detail.as_ref(),
                "JournalEntryLineDetail",
            )?),
            "DiscountLineDetail" => LineDetail::Discount(present(
                self.discount_line_detail.as_ref(),
                "DiscountLineDetail",
            )?),
            "DepositLineDetail" => LineDetail::Deposit(present(
                self.deposit_line_detail.as_ref(),
                "DepositLineDetail",
            )?),
            "DescriptionOnly" => LineDetail::DescriptionOnly,
            "SubTotalLineDetail" => LineDetail::SubTotal,
            other => LineDetail::Other(other),
        })
    }

    /// Percentage margin written as a description only line, e.g. `"15%"`.
    #[must_use]
    pub fn margin_percentage(&self) -> Option<Decimal> {
        let text = self.description.as_deref()?.trim();
        let (number, _) = text.split_once('%')?;
        number.trim().parse().ok()
    }

    /// First linked transaction, if any.
    #[must_use]
    pub fn first_link(&self) -> Option<&LinkedTxn> {
        self.linked_txn.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn line(value: serde_json::Value) -> Line {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_sales_item_detail() {
        let line = line(json!({
            "Id": "1",
            "Amount": 150.0,
            "DetailType": "SalesItemLineDetail",
            "SalesItemLineDetail": {
                "ItemRef": {"value": "5", "name": "Rock Fountain"},
                "Qty": 2,
                "UnitPrice": 75,
                "TaxCodeRef": {"value": "TAX"}
            }
        }));

        let LineDetail::SalesItem(detail) = line.detail().unwrap() else {
            panic!("expected sales item");
        };
        assert_eq!(detail.item_ref.value, "5");
        assert_eq!(detail.qty, Some(dec!(2)));
        assert_eq!(line.amount, dec!(150));
    }

    #[test]
    fn test_declared_detail_must_be_present() {
        let line = line(json!({"Amount": 10, "DetailType": "JournalEntryLineDetail"}));
        assert!(matches!(
            line.detail(),
            Err(SourceError::MissingField {
                field: "JournalEntryLineDetail",
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_detail_type_is_carried() {
        let line = line(json!({"Amount": 10, "DetailType": "GroupLineDetail"}));
        assert!(matches!(line.detail(), Ok(LineDetail::Other("GroupLineDetail"))));
    }

    #[test]
    fn test_margin_percentage() {
        let mut margin = line(json!({"DetailType": "DescriptionOnly", "Description": "15% markup"}));
        assert_eq!(margin.margin_percentage(), Some(dec!(15)));

        margin.description = Some("no margin here".to_string());
        assert_eq!(margin.margin_percentage(), None);
    }
}
