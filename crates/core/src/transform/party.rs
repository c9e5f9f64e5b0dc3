//! Customers, suppliers and their addresses.

use tracing::warn;

use super::{Outcome, TransformContext, TransformError};
use crate::document::{
    AccountKind, AddressDoc, AddressType, CustomerDoc, DocType, Document, DynamicLink,
    SupplierDoc, encode_company_abbr,
};
use crate::source::{Customer, PhysicalAddress, Vendor};

/// First receivable account in `currency`, or in any currency when the
/// customer has none.
pub async fn receivable_account(
    ctx: &TransformContext<'_>,
    currency: Option<&str>,
) -> Result<Option<String>, TransformError> {
    let accounts = ctx.store.list(DocType::Account, ctx.company()).await?;
    Ok(accounts.into_iter().find_map(|stored| match stored.document {
        Document::Account(doc)
            if doc.account_type == Some(AccountKind::Receivable)
                && currency.is_none_or(|c| doc.account_currency.as_deref() == Some(c)) =>
        {
            Some(stored.name)
        }
        _ => None,
    }))
}

/// Migrates a customer and its addresses.
pub async fn save_customer(
    ctx: &TransformContext<'_>,
    customer: &Customer,
) -> Result<Outcome, TransformError> {
    if ctx.exists(DocType::Customer, &customer.id).await? {
        return Ok(Outcome::AlreadyImported);
    }

    let currency = customer.currency_ref.as_ref().map(|c| c.value.clone());
    let receivable = receivable_account(ctx, currency.as_deref()).await?;
    let name = ctx
        .insert(Document::Customer(CustomerDoc {
            name: encode_company_abbr(&customer.display_name, &ctx.settings.abbr),
            quickbooks_id: customer.id.clone(),
            customer_type: "Individual".to_string(),
            customer_group: "Commercial".to_string(),
            territory: "All Territories".to_string(),
            default_currency: currency,
            receivable_account: receivable,
            company: ctx.company().to_string(),
        }))
        .await?;

    let mut created = vec![name.clone()];
    created.extend(
        save_addresses(
            ctx,
            DocType::Customer,
            &name,
            customer.bill_addr.as_ref(),
            customer.ship_addr.as_ref(),
        )
        .await,
    );
    Ok(Outcome::Created(created))
}

/// Migrates a vendor as a supplier, with its addresses.
pub async fn save_vendor(
    ctx: &TransformContext<'_>,
    vendor: &Vendor,
) -> Result<Outcome, TransformError> {
    if ctx.exists(DocType::Supplier, &vendor.id).await? {
        return Ok(Outcome::AlreadyImported);
    }

    let name = ctx
        .insert(Document::Supplier(SupplierDoc {
            name: encode_company_abbr(&vendor.display_name, &ctx.settings.abbr),
            quickbooks_id: vendor.id.clone(),
            supplier_group: "All Supplier Groups".to_string(),
            company: ctx.company().to_string(),
        }))
        .await?;

    let mut created = vec![name.clone()];
    created.extend(
        save_addresses(
            ctx,
            DocType::Supplier,
            &name,
            vendor.bill_addr.as_ref(),
            vendor.ship_addr.as_ref(),
        )
        .await,
    );
    Ok(Outcome::Created(created))
}

/// Saves billing and shipping addresses. A failed address is logged and does
/// not fail the party.
async fn save_addresses(
    ctx: &TransformContext<'_>,
    link_doctype: DocType,
    party: &str,
    billing: Option<&PhysicalAddress>,
    shipping: Option<&PhysicalAddress>,
) -> Vec<String> {
    let mut created = Vec::new();
    let addresses = [(billing, AddressType::Billing), (shipping, AddressType::Shipping)];
    for (address, address_type) in addresses {
        let Some(address) = address else { continue };
        match save_address(ctx, link_doctype, party, address, address_type).await {
            Ok(Some(name)) => created.push(name),
            Ok(None) => {}
            Err(e) => warn!(
                error = %e,
                party = %party,
                address_id = %address.id,
                "Failed to save address"
            ),
        }
    }
    created
}

async fn save_address(
    ctx: &TransformContext<'_>,
    link_doctype: DocType,
    party: &str,
    address: &PhysicalAddress,
    address_type: AddressType,
) -> Result<Option<String>, TransformError> {
    if ctx.exists(DocType::Address, &address.id).await? {
        return Ok(None);
    }

    let name = ctx
        .insert(Document::Address(AddressDoc {
            name: format!("{party}-{}", address_type.as_str()),
            quickbooks_id: address.id.clone(),
            address_title: party.to_string(),
            address_type,
            address_line1: address.line1.clone(),
            city: address.city.clone(),
            links: vec![DynamicLink {
                link_doctype,
                link_name: party.to_string(),
            }],
            company: ctx.company().to_string(),
        }))
        .await?;
    Ok(Some(name))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{Harness, parse};
    use super::*;
    use crate::document::DocumentStore;
    use serde_json::json;

    fn customer() -> Customer {
        parse(json!({
            "Id": "58",
            "DisplayName": "Amy's Bird Sanctuary",
            "CurrencyRef": {"value": "USD"},
            "BillAddr": {"Id": "2", "Line1": "4581 Finch St.", "City": "Bayshore"},
            "ShipAddr": {"Id": "3", "Line1": "4581 Finch St.", "City": "Bayshore"}
        }))
    }

    #[tokio::test]
    async fn test_customer_gets_receivable_in_its_currency() {
        let harness = Harness::new();
        harness
            .seed_account("80", "Debtors EUR - AL", Some(AccountKind::Receivable), Some("EUR"))
            .await;
        harness
            .seed_account("84", "Debtors - AL", Some(AccountKind::Receivable), Some("USD"))
            .await;

        let outcome = save_customer(&harness.ctx(), &customer()).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Created(vec![
                "Amy's Bird Sanctuary - AL".into(),
                "Amy's Bird Sanctuary - AL-Billing".into(),
                "Amy's Bird Sanctuary - AL-Shipping".into(),
            ])
        );

        let stored = harness
            .store
            .find(DocType::Customer, "58", "Acme Ltd")
            .await
            .unwrap()
            .unwrap();
        let Document::Customer(doc) = stored.document else {
            panic!("expected customer");
        };
        assert_eq!(doc.receivable_account.as_deref(), Some("Debtors - AL"));
        assert_eq!(doc.territory, "All Territories");
    }

    #[tokio::test]
    async fn test_address_links_party() {
        let harness = Harness::new();
        save_customer(&harness.ctx(), &customer()).await.unwrap();

        let stored = harness
            .store
            .find(DocType::Address, "2", "Acme Ltd")
            .await
            .unwrap()
            .unwrap();
        let Document::Address(address) = stored.document else {
            panic!("expected address");
        };
        assert_eq!(address.address_type, AddressType::Billing);
        assert_eq!(address.city.as_deref(), Some("Bayshore"));
        assert_eq!(address.links[0].link_doctype, DocType::Customer);
        assert_eq!(address.links[0].link_name, "Amy's Bird Sanctuary - AL");
    }

    #[tokio::test]
    async fn test_vendor_is_idempotent() {
        let harness = Harness::new();
        let vendor: Vendor = parse(json!({"Id": "41", "DisplayName": "Hicks Hardware"}));

        let first = save_vendor(&harness.ctx(), &vendor).await.unwrap();
        assert_eq!(first, Outcome::created("Hicks Hardware - AL".into()));
        let second = save_vendor(&harness.ctx(), &vendor).await.unwrap();
        assert_eq!(second, Outcome::AlreadyImported);
        assert_eq!(harness.store.count(DocType::Supplier), 1);
    }
}
