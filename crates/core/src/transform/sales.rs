//! Invoices, credit memos and receipts.
//!
//! All four become sales invoices. Credit memos and refund receipts are
//! returns with negated quantities; sales and refund receipts are paid at
//! the point of sale into their deposit account. Invoices drawn from a
//! statement or reimburse charge carry no usable lines and are rebuilt from
//! their General Ledger entry as journal entries instead.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::item::STOCK_UOM;
use super::party::receivable_account;
use super::{Outcome, TransformContext, TransformError, tax};
use crate::document::{
    AccountKind, DiscountBasis, DocType, Document, InvoiceItem, JournalEntryDoc, JournalLine,
    PartyType, PosPayment, SalesInvoiceDoc,
};
use crate::source::{
    EntityKind, Line, LineDetail, Reference, SHIPPING_ITEM_ID, SalesTransaction,
    resolve_tax_code,
};

/// Mode of payment recorded on point of sale payments.
pub const POS_MODE_OF_PAYMENT: &str = "Cash";

/// Which QuickBooks sales transaction a record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesFlavor {
    /// Invoice.
    Invoice,
    /// Credit memo.
    CreditMemo,
    /// Sales receipt.
    SalesReceipt,
    /// Refund receipt.
    RefundReceipt,
}

impl SalesFlavor {
    /// Entity the record was fetched as.
    #[must_use]
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::Invoice => EntityKind::Invoice,
            Self::CreditMemo => EntityKind::CreditMemo,
            Self::SalesReceipt => EntityKind::SalesReceipt,
            Self::RefundReceipt => EntityKind::RefundReceipt,
        }
    }

    /// Whether the invoice reverses a sale.
    #[must_use]
    pub const fn is_return(self) -> bool {
        matches!(self, Self::CreditMemo | Self::RefundReceipt)
    }

    /// Whether the invoice is paid on the spot.
    #[must_use]
    pub const fn is_pos(self) -> bool {
        matches!(self, Self::SalesReceipt | Self::RefundReceipt)
    }
}

/// Migrates an invoice, routing charge-backed invoices through the ledger.
pub async fn save_invoice(
    ctx: &TransformContext<'_>,
    invoice: &SalesTransaction,
) -> Result<Outcome, TransformError> {
    if invoice.is_linked_to_gl_only_charge() {
        save_invoice_as_journal_entry(ctx, invoice).await
    } else {
        save_sales_invoice(ctx, invoice, SalesFlavor::Invoice).await
    }
}

/// Migrates a sales transaction as a sales invoice.
pub async fn save_sales_invoice(
    ctx: &TransformContext<'_>,
    txn: &SalesTransaction,
    flavor: SalesFlavor,
) -> Result<Outcome, TransformError> {
    let kind = flavor.kind();
    let key = kind.key(&txn.id);
    if ctx.exists(DocType::SalesInvoice, &key).await? {
        return Ok(Outcome::AlreadyImported);
    }

    let customer = ctx.lookup(DocType::Customer, &txn.customer_ref.value).await?;
    let currency = txn.currency_ref.as_ref().map(|c| c.value.clone());
    let debit_to = match &customer.document {
        Document::Customer(doc) if doc.receivable_account.is_some() => {
            doc.receivable_account.clone()
        }
        _ => receivable_account(ctx, currency.as_deref()).await?,
    };

    let items = sales_items(ctx, txn, flavor.is_return()).await?;
    let taxes = tax::tax_rows(ctx, txn.txn_tax_detail.as_ref()).await?;
    let payments = if flavor.is_pos() {
        let deposit = txn
            .deposit_to_account_ref
            .as_ref()
            .ok_or(TransformError::MissingField {
                entity: kind.api_name(),
                field: "DepositToAccountRef",
            })?;
        vec![PosPayment {
            mode_of_payment: POS_MODE_OF_PAYMENT.to_string(),
            account: ctx.account_name(&deposit.value).await?,
            amount: signed(txn.total_amt, flavor.is_return()),
        }]
    } else {
        Vec::new()
    };
    let discount = discount(txn).map(|(basis, amount)| (basis, signed(amount, flavor.is_return())));

    let name = ctx
        .insert(Document::SalesInvoice(SalesInvoiceDoc {
            quickbooks_id: key,
            company: ctx.company().to_string(),
            customer: customer.name,
            currency,
            conversion_rate: txn.exchange_rate.unwrap_or(Decimal::ONE),
            posting_date: txn.txn_date,
            due_date: txn.due_date.unwrap_or(txn.txn_date),
            debit_to,
            items,
            taxes,
            is_return: flavor.is_return(),
            is_pos: flavor.is_pos(),
            payments,
            apply_discount_on: discount.map(|(basis, _)| basis),
            discount_amount: discount.map(|(_, amount)| amount),
        }))
        .await?;
    Ok(Outcome::created(name))
}

fn signed(amount: Decimal, negate: bool) -> Decimal {
    if negate { -amount } else { amount }
}

/// Discount basis and amount from the first non-zero discount line.
fn discount(txn: &SalesTransaction) -> Option<(DiscountBasis, Decimal)> {
    let line = txn
        .line
        .iter()
        .find(|line| line.detail_type == "DiscountLineDetail" && !line.amount.is_zero())?;
    let basis = if txn.apply_tax_after_discount {
        DiscountBasis::NetTotal
    } else {
        DiscountBasis::GrandTotal
    };
    Some((basis, line.amount))
}

async fn sales_items(
    ctx: &TransformContext<'_>,
    txn: &SalesTransaction,
    is_return: bool,
) -> Result<Vec<InvoiceItem>, TransformError> {
    let mut items: Vec<InvoiceItem> = Vec::new();
    for line in &txn.line {
        match line.detail()? {
            LineDetail::SalesItem(detail) => {
                let tax_code =
                    resolve_tax_code(detail.tax_code_ref.as_ref(), txn.txn_tax_detail.as_ref());
                let item_tax_rate = tax::item_tax_rate(ctx, tax_code).await?;
                let mut item = if detail.item_ref.value == SHIPPING_ITEM_ID {
                    shipping_item(ctx, line, detail.tax_code_ref.as_ref()).await?
                } else {
                    let stored = ctx.lookup(DocType::Item, &detail.item_ref.value).await?;
                    let Document::Item(item) = stored.document else {
                        return Err(TransformError::MissingReference {
                            doctype: DocType::Item,
                            quickbooks_id: detail.item_ref.value.clone(),
                        });
                    };
                    InvoiceItem {
                        item_code: Some(stored.name.clone()),
                        item_name: Some(stored.name),
                        description: line.description.clone(),
                        qty: detail.qty.unwrap_or(Decimal::ONE),
                        uom: STOCK_UOM.to_string(),
                        rate: detail.unit_price.unwrap_or(line.amount),
                        conversion_factor: Decimal::ONE,
                        income_account: item.income_account,
                        expense_account: item.expense_account,
                        cost_center: ctx.settings.cost_center.clone(),
                        warehouse: ctx.settings.warehouse.clone(),
                        item_tax_rate: BTreeMap::new(),
                        margin: None,
                    }
                };
                item.item_tax_rate = item_tax_rate;
                if is_return {
                    item.qty = -item.qty;
                }
                items.push(item);
            }
            LineDetail::DescriptionOnly => {
                if let (Some(previous), Some(margin)) = (items.last_mut(), line.margin_percentage())
                {
                    previous.margin = Some(margin);
                }
            }
            _ => {}
        }
    }
    Ok(items)
}

/// Row for QuickBooks' shipping pseudo-item, booked to the shipping account.
///
/// The expense account is the tax-rate account keyed by the line's own tax
/// code, when one was imported under that id.
async fn shipping_item(
    ctx: &TransformContext<'_>,
    line: &Line,
    tax_code_ref: Option<&Reference>,
) -> Result<InvoiceItem, TransformError> {
    let expense_account = match tax_code_ref {
        Some(code) => ctx
            .store
            .find(
                DocType::Account,
                &EntityKind::TaxRate.key(&code.value),
                ctx.company(),
            )
            .await?
            .map(|stored| stored.name),
        None => None,
    };
    Ok(InvoiceItem {
        item_code: None,
        item_name: Some("Shipping".to_string()),
        description: Some(line.description.clone().unwrap_or_else(|| "Shipping".to_string())),
        qty: Decimal::ONE,
        uom: STOCK_UOM.to_string(),
        rate: line.amount,
        conversion_factor: Decimal::ONE,
        income_account: ctx.defaults.shipping_account.clone(),
        expense_account,
        cost_center: ctx.settings.cost_center.clone(),
        warehouse: None,
        item_tax_rate: BTreeMap::new(),
        margin: None,
    })
}

/// Rebuilds a charge-backed invoice from its General Ledger entry.
///
/// Lines post their debit when non-zero, else their credit. Receivable rows
/// carry the invoice's customer as party.
pub async fn save_invoice_as_journal_entry(
    ctx: &TransformContext<'_>,
    invoice: &SalesTransaction,
) -> Result<Outcome, TransformError> {
    let key = EntityKind::Invoice.key(&invoice.id);
    if ctx.exists(DocType::JournalEntry, &key).await? {
        return Ok(Outcome::AlreadyImported);
    }

    let txn_type = EntityKind::Invoice.api_name();
    let entry = ctx
        .ledger
        .entry(txn_type, &invoice.id)
        .ok_or_else(|| TransformError::MissingLedgerEntry {
            txn_type: txn_type.to_string(),
            id: invoice.id.clone(),
        })?;
    let customer = ctx.lookup(DocType::Customer, &invoice.customer_ref.value).await?;

    let mut accounts = Vec::with_capacity(entry.lines.len());
    for line in &entry.lines {
        let (debit, credit) = line.debit_first();
        let mut row = JournalLine::new(
            line.account.clone(),
            debit,
            credit,
            ctx.settings.cost_center.clone(),
        );
        if is_receivable(ctx, &line.account).await? {
            row = row.with_party(PartyType::Customer, customer.name.clone());
        }
        accounts.push(row);
    }

    let name = ctx
        .insert(Document::JournalEntry(JournalEntryDoc {
            quickbooks_id: key,
            company: ctx.company().to_string(),
            posting_date: invoice.txn_date,
            accounts,
        }))
        .await?;
    Ok(Outcome::created(name))
}

async fn is_receivable(ctx: &TransformContext<'_>, account: &str) -> Result<bool, TransformError> {
    let stored = ctx.store.find_by_name(DocType::Account, account).await?;
    Ok(matches!(
        stored.map(|stored| stored.document),
        Some(Document::Account(doc)) if doc.account_type == Some(AccountKind::Receivable)
    ))
}

#[cfg(test)]
#[path = "sales_tests.rs"]
mod tests;
