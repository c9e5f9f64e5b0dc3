//! Products and services.

use super::{Outcome, TransformContext, TransformError};
use crate::document::{DocType, Document, ItemDoc, encode_company_abbr};
use crate::source::{Item, Reference};

/// Item group every migrated item joins.
pub const ITEM_GROUP: &str = "All Item Groups";

/// Unit of measure for migrated items and invoice rows.
pub const STOCK_UOM: &str = "Unit";

async fn resolve_account(
    ctx: &TransformContext<'_>,
    reference: Option<&Reference>,
) -> Result<Option<String>, TransformError> {
    match reference {
        Some(reference) => Ok(Some(ctx.account_name(&reference.value).await?)),
        None => Ok(None),
    }
}

/// Migrates a service or inventory item. Other item types are skipped.
pub async fn save_item(ctx: &TransformContext<'_>, item: &Item) -> Result<Outcome, TransformError> {
    if !item.item_type.is_migrated() {
        return Ok(Outcome::Skipped("item type is not migrated"));
    }
    if ctx.exists(DocType::Item, &item.id).await? {
        return Ok(Outcome::AlreadyImported);
    }

    let income_account = resolve_account(ctx, item.income_account_ref.as_ref()).await?;
    let expense_account = resolve_account(ctx, item.expense_account_ref.as_ref()).await?;
    let name = ctx
        .insert(Document::Item(ItemDoc {
            name: encode_company_abbr(&item.name, &ctx.settings.abbr),
            quickbooks_id: item.id.clone(),
            item_group: ITEM_GROUP.to_string(),
            stock_uom: STOCK_UOM.to_string(),
            is_stock_item: false,
            default_warehouse: ctx.settings.warehouse.clone(),
            income_account,
            expense_account,
            company: ctx.company().to_string(),
        }))
        .await?;
    Ok(Outcome::created(name))
}
