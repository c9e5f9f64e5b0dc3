//! Transactions migrated as journal entries.
//!
//! Payments and bill payments settle invoices migrated earlier in the run;
//! purchases and deposits post straight to accounts.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{Outcome, TransformContext, TransformError};
use crate::document::{DocType, Document, JournalEntryDoc, JournalLine, PartyType};
use crate::source::{
    BillPayment, Deposit, EntityKind, JournalEntry, LineDetail, Payment, PostingType, Purchase,
};

async fn insert_journal(
    ctx: &TransformContext<'_>,
    quickbooks_id: String,
    posting_date: NaiveDate,
    accounts: Vec<JournalLine>,
) -> Result<Outcome, TransformError> {
    let name = ctx
        .insert(Document::JournalEntry(JournalEntryDoc {
            quickbooks_id,
            company: ctx.company().to_string(),
            posting_date,
            accounts,
        }))
        .await?;
    Ok(Outcome::created(name))
}

fn row(ctx: &TransformContext<'_>, account: String, debit: Decimal, credit: Decimal) -> JournalLine {
    JournalLine::new(account, debit, credit, ctx.settings.cost_center.clone())
}

/// Migrates a manual journal entry.
pub async fn save_journal_entry(
    ctx: &TransformContext<'_>,
    entry: &JournalEntry,
) -> Result<Outcome, TransformError> {
    let key = EntityKind::JournalEntry.key(&entry.id);
    if ctx.exists(DocType::JournalEntry, &key).await? {
        return Ok(Outcome::AlreadyImported);
    }

    let mut accounts = Vec::with_capacity(entry.line.len());
    for line in &entry.line {
        let LineDetail::JournalEntry(detail) = line.detail()? else {
            continue;
        };
        let account = ctx.account_name(&detail.account_ref.value).await?;
        accounts.push(match detail.posting_type {
            PostingType::Debit => row(ctx, account, line.amount, Decimal::ZERO),
            PostingType::Credit => row(ctx, account, Decimal::ZERO, line.amount),
        });
    }
    insert_journal(ctx, key, entry.txn_date, accounts).await
}

/// Migrates a customer payment.
///
/// Each line credits the receivable of the invoice it settles, whether that
/// invoice became a sales invoice or a journal entry. The deposit account is
/// debited with the total.
pub async fn save_payment(
    ctx: &TransformContext<'_>,
    payment: &Payment,
) -> Result<Outcome, TransformError> {
    let key = EntityKind::Payment.key(&payment.id);
    if ctx.exists(DocType::JournalEntry, &key).await? {
        return Ok(Outcome::AlreadyImported);
    }
    let Some(deposit) = payment.deposit_to_account_ref.as_ref() else {
        return Ok(Outcome::Skipped("payment has no deposit account"));
    };

    let mut accounts = Vec::with_capacity(payment.line.len() + 1);
    for line in &payment.line {
        let Some(link) = line.first_link().filter(|link| link.txn_type == "Invoice") else {
            continue;
        };
        let invoice_key = EntityKind::Invoice.key(&link.txn_id);
        accounts.push(settle_invoice(ctx, &invoice_key, line.amount).await?);
    }
    accounts.push(row(
        ctx,
        ctx.account_name(&deposit.value).await?,
        payment.total_amt,
        Decimal::ZERO,
    ));
    insert_journal(ctx, key, payment.txn_date, accounts).await
}

async fn settle_invoice(
    ctx: &TransformContext<'_>,
    invoice_key: &str,
    amount: Decimal,
) -> Result<JournalLine, TransformError> {
    let company = ctx.company();
    if let Some(stored) = ctx
        .store
        .find(DocType::SalesInvoice, invoice_key, company)
        .await?
        && let Document::SalesInvoice(invoice) = stored.document
    {
        let receivable = invoice.debit_to.ok_or(TransformError::MissingField {
            entity: "Sales Invoice",
            field: "debit_to",
        })?;
        return Ok(row(ctx, receivable, Decimal::ZERO, amount)
            .with_party(PartyType::Customer, invoice.customer)
            .with_reference(DocType::SalesInvoice, stored.name));
    }

    if let Some(stored) = ctx
        .store
        .find(DocType::JournalEntry, invoice_key, company)
        .await?
        && let Document::JournalEntry(journal) = &stored.document
        && let Some(customer_line) = journal.customer_line()
    {
        let mut settled = row(ctx, customer_line.account.clone(), Decimal::ZERO, amount)
            .with_reference(DocType::JournalEntry, stored.name.clone());
        if let Some(customer) = &customer_line.party {
            settled = settled.with_party(PartyType::Customer, customer.clone());
        }
        return Ok(settled);
    }

    Err(TransformError::MissingReference {
        doctype: DocType::SalesInvoice,
        quickbooks_id: invoice_key.to_string(),
    })
}

/// Migrates a vendor bill payment.
///
/// Each line debits the payable of the bill it settles; the bank or credit
/// card account is credited with the total.
pub async fn save_bill_payment(
    ctx: &TransformContext<'_>,
    payment: &BillPayment,
) -> Result<Outcome, TransformError> {
    let key = EntityKind::BillPayment.key(&payment.id);
    if ctx.exists(DocType::JournalEntry, &key).await? {
        return Ok(Outcome::AlreadyImported);
    }
    let paying = payment
        .paying_account()
        .ok_or(TransformError::MissingField {
            entity: "BillPayment",
            field: "paying account",
        })?;

    let mut accounts = Vec::with_capacity(payment.line.len() + 1);
    for line in &payment.line {
        let Some(link) = line.first_link().filter(|link| link.txn_type == "Bill") else {
            continue;
        };
        let bill_key = EntityKind::Bill.key(&link.txn_id);
        let stored = ctx.lookup(DocType::PurchaseInvoice, &bill_key).await?;
        let Document::PurchaseInvoice(bill) = stored.document else {
            return Err(TransformError::MissingReference {
                doctype: DocType::PurchaseInvoice,
                quickbooks_id: bill_key,
            });
        };
        accounts.push(
            row(ctx, bill.credit_to, line.amount, Decimal::ZERO)
                .with_party(PartyType::Supplier, bill.supplier)
                .with_reference(DocType::PurchaseInvoice, stored.name),
        );
    }
    accounts.push(row(
        ctx,
        ctx.account_name(&paying.value).await?,
        Decimal::ZERO,
        payment.total_amt,
    ));
    insert_journal(ctx, key, payment.txn_date, accounts).await
}

/// Migrates an expense, check or credit card charge.
///
/// The paying account is credited with the total; expense lines and tax
/// lines are debited. A credit card credit (`Credit = true`) swaps every row.
pub async fn save_purchase(
    ctx: &TransformContext<'_>,
    purchase: &Purchase,
) -> Result<Outcome, TransformError> {
    let key = EntityKind::Purchase.key(&purchase.id);
    if ctx.exists(DocType::JournalEntry, &key).await? {
        return Ok(Outcome::AlreadyImported);
    }

    let mut accounts = vec![row(
        ctx,
        ctx.account_name(&purchase.account_ref.value).await?,
        Decimal::ZERO,
        purchase.total_amt,
    )];
    for line in &purchase.line {
        let account = match line.detail()? {
            LineDetail::AccountBasedExpense(detail) => {
                ctx.account_name(&detail.account_ref.value).await?
            }
            LineDetail::ItemBasedExpense(detail) => {
                let stored = ctx.lookup(DocType::Item, &detail.item_ref.value).await?;
                let expense_account = match stored.document {
                    Document::Item(item) => item.expense_account,
                    _ => None,
                };
                expense_account.ok_or(TransformError::MissingField {
                    entity: "Item",
                    field: "expense_account",
                })?
            }
            _ => continue,
        };
        accounts.push(row(ctx, account, line.amount, Decimal::ZERO));
    }
    if let Some(detail) = &purchase.txn_tax_detail {
        for tax in &detail.tax_line {
            let rate_key = EntityKind::TaxRate.key(&tax.tax_line_detail.tax_rate_ref.value);
            accounts.push(row(
                ctx,
                ctx.account_name(&rate_key).await?,
                tax.amount,
                Decimal::ZERO,
            ));
        }
    }

    if purchase.credit == Some(true) {
        accounts = accounts.into_iter().map(JournalLine::swapped).collect();
    }
    insert_journal(ctx, key, purchase.txn_date, accounts).await
}

/// Migrates a bank deposit.
///
/// The deposit account is debited with the total. Lines drawn from earlier
/// payments credit undeposited funds; other lines credit their own account.
/// Cash back is debited to its account.
pub async fn save_deposit(
    ctx: &TransformContext<'_>,
    deposit: &Deposit,
) -> Result<Outcome, TransformError> {
    let key = EntityKind::Deposit.key(&deposit.id);
    if ctx.exists(DocType::JournalEntry, &key).await? {
        return Ok(Outcome::AlreadyImported);
    }

    let mut accounts = vec![row(
        ctx,
        ctx.account_name(&deposit.deposit_to_account_ref.value).await?,
        deposit.total_amt,
        Decimal::ZERO,
    )];
    for line in &deposit.line {
        let account = if line.first_link().is_some() {
            ctx.defaults
                .undeposited_funds_account
                .clone()
                .ok_or(TransformError::MissingDefault("undeposited funds account"))?
        } else {
            let source = match line.detail()? {
                LineDetail::Deposit(detail) => detail.account_ref.as_ref(),
                _ => None,
            }
            .ok_or(TransformError::MissingField {
                entity: "Deposit",
                field: "DepositLineDetail.AccountRef",
            })?;
            ctx.account_name(&source.value).await?
        };
        accounts.push(row(ctx, account, Decimal::ZERO, line.amount));
    }
    if let Some(cash_back) = &deposit.cash_back {
        accounts.push(row(
            ctx,
            ctx.account_name(&cash_back.account_ref.value).await?,
            cash_back.amount,
            Decimal::ZERO,
        ));
    }
    insert_journal(ctx, key, deposit.txn_date, accounts).await
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
