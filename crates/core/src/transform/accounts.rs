//! Chart of accounts migration.
//!
//! Every QuickBooks root type gets a `"{Root} - QB"` group account. A source
//! account that other accounts name as parent becomes two target accounts: a
//! group keyed `Group - {Id}` that children hang under, and a leaf keyed
//! `{Id}` inside it that carries the postings.

use std::collections::{HashMap, HashSet};

use super::{Outcome, TransformContext, TransformError};
use crate::document::{AccountDoc, DocType, Document, RootType, encode_company_abbr};
use crate::source::Account;

/// Key prefix of the group half of a parent account.
pub const GROUP_PREFIX: &str = "Group";

/// Key of the group account created for a parent account.
#[must_use]
pub fn group_key(id: &str) -> String {
    format!("{GROUP_PREFIX} - {id}")
}

/// Facts about the source chart that single records cannot tell.
#[derive(Debug, Clone, Default)]
pub struct AccountChart {
    group_ids: HashSet<String>,
    id_by_display_name: HashMap<String, String>,
}

impl AccountChart {
    /// Indexes the fetched accounts and returns them in creation order.
    ///
    /// Accounts are created by ascending numeric id; QuickBooks assigns ids in
    /// creation order, so a parent comes before its children.
    #[must_use]
    pub fn prepare(mut accounts: Vec<Account>) -> (Self, Vec<Account>) {
        accounts.sort_by(|a, b| {
            numeric_id(&a.id)
                .cmp(&numeric_id(&b.id))
                .then_with(|| a.id.cmp(&b.id))
        });

        let group_ids = accounts
            .iter()
            .filter_map(Account::parent_id)
            .map(str::to_string)
            .collect();
        let id_by_display_name = accounts
            .iter()
            .map(|account| (account.name.clone(), account.id.clone()))
            .collect();

        (
            Self {
                group_ids,
                id_by_display_name,
            },
            accounts,
        )
    }

    /// Whether some account names `id` as its parent.
    #[must_use]
    pub fn is_group(&self, id: &str) -> bool {
        self.group_ids.contains(id)
    }

    /// Source display names with their account ids.
    pub fn display_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.id_by_display_name
            .iter()
            .map(|(name, id)| (name.as_str(), id.as_str()))
    }
}

fn numeric_id(id: &str) -> u64 {
    id.parse().unwrap_or(u64::MAX)
}

/// Creates the group account for a root type unless it exists.
pub async fn make_root_account(
    ctx: &TransformContext<'_>,
    root: RootType,
) -> Result<Outcome, TransformError> {
    let account_name = root.group_account_name();
    let name = encode_company_abbr(&account_name, &ctx.settings.abbr);
    if ctx
        .store
        .find_by_name(DocType::Account, &name)
        .await?
        .is_some()
    {
        return Ok(Outcome::AlreadyImported);
    }

    let name = ctx
        .insert(Document::Account(AccountDoc {
            name,
            account_name,
            quickbooks_id: None,
            root_type: root,
            account_type: None,
            account_currency: None,
            parent_account: None,
            is_group: true,
            company: ctx.company().to_string(),
        }))
        .await?;
    Ok(Outcome::created(name))
}

/// Finds a free account name for `name`.
///
/// Returns the account name and the company-encoded document name: `"{name}
/// - QB"` first, then `"{name} - 1 - QB"`, `"{name} - 2 - QB"` and so on.
pub async fn unique_account_name(
    ctx: &TransformContext<'_>,
    name: &str,
) -> Result<(String, String), TransformError> {
    let mut candidate = format!("{name} - QB");
    let mut suffix = 0_u32;
    loop {
        let encoded = encode_company_abbr(&candidate, &ctx.settings.abbr);
        if ctx
            .store
            .find_by_name(DocType::Account, &encoded)
            .await?
            .is_none()
        {
            return Ok((candidate, encoded));
        }
        suffix += 1;
        candidate = format!("{name} - {suffix} - QB");
    }
}

/// Migrates one source account.
pub async fn save_account(
    ctx: &TransformContext<'_>,
    account: &Account,
) -> Result<Outcome, TransformError> {
    if ctx.exists(DocType::Account, &account.id).await? {
        return Ok(Outcome::AlreadyImported);
    }

    let root_type = account.account_type.root_type();
    let parent = match account.parent_id() {
        Some(parent_id) => ctx.account_name(&group_key(parent_id)).await?,
        None => encode_company_abbr(&root_type.group_account_name(), &ctx.settings.abbr),
    };
    let is_group = ctx.chart.is_group(&account.id);

    let (account_name, name) = unique_account_name(ctx, &account.name).await?;
    let document = AccountDoc {
        name,
        account_name,
        quickbooks_id: Some(if is_group {
            group_key(&account.id)
        } else {
            account.id.clone()
        }),
        root_type,
        account_type: account.account_kind(),
        account_currency: account.currency().map(str::to_string),
        parent_account: Some(parent),
        is_group,
        company: ctx.company().to_string(),
    };

    let mut created = Vec::with_capacity(2);
    let group_name = ctx.insert(Document::Account(document.clone())).await?;
    created.push(group_name.clone());

    if is_group {
        let (account_name, name) = unique_account_name(ctx, &account.name).await?;
        let leaf = AccountDoc {
            name,
            account_name,
            quickbooks_id: Some(account.id.clone()),
            parent_account: Some(group_name),
            is_group: false,
            ..document
        };
        created.push(ctx.insert(Document::Account(leaf)).await?);
    }

    Ok(Outcome::Created(created))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{Harness, parse};
    use super::*;
    use crate::document::{AccountKind, DocumentStore};
    use serde_json::json;

    fn account(value: serde_json::Value) -> Account {
        parse(value)
    }

    async fn with_roots(harness: &Harness) {
        for root in RootType::ALL {
            make_root_account(&harness.ctx(), root).await.unwrap();
        }
    }

    async fn stored_account(harness: &Harness, key: &str) -> AccountDoc {
        match harness
            .store
            .find(DocType::Account, key, "Acme Ltd")
            .await
            .unwrap()
            .unwrap()
            .document
        {
            Document::Account(doc) => doc,
            other => panic!("expected account, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_root_accounts_are_created_once() {
        let harness = Harness::new();
        with_roots(&harness).await;
        let again = make_root_account(&harness.ctx(), RootType::Asset).await.unwrap();

        assert_eq!(again, Outcome::AlreadyImported);
        assert_eq!(harness.store.count(DocType::Account), 5);
        assert!(
            harness
                .store
                .find_by_name(DocType::Account, "Income - QB - AL")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_unique_name_skips_taken_names() {
        let harness = Harness::new();
        harness.seed_account("1", "Sales - QB - AL", None, None).await;
        harness.seed_account("2", "Sales - 1 - QB - AL", None, None).await;

        let (account_name, name) = unique_account_name(&harness.ctx(), "Sales").await.unwrap();
        assert_eq!(account_name, "Sales - 2 - QB");
        assert_eq!(name, "Sales - 2 - QB - AL");
    }

    #[tokio::test]
    async fn test_top_level_account_hangs_under_root() {
        let harness = Harness::new();
        with_roots(&harness).await;
        let checking = account(json!({
            "Id": "35", "Name": "Checking", "AccountType": "Bank",
            "CurrencyRef": {"value": "USD"}
        }));

        let outcome = save_account(&harness.ctx(), &checking).await.unwrap();
        assert_eq!(outcome, Outcome::created("Checking - QB - AL".into()));

        let doc = stored_account(&harness, "35").await;
        assert_eq!(doc.parent_account.as_deref(), Some("Asset - QB - AL"));
        assert_eq!(doc.account_type, Some(AccountKind::Bank));
        assert_eq!(doc.account_currency.as_deref(), Some("USD"));
        assert!(!doc.is_group);
    }

    #[tokio::test]
    async fn test_parent_account_becomes_group_and_leaf() {
        let mut harness = Harness::new();
        let (chart, ordered) = AccountChart::prepare(vec![
            account(json!({
                "Id": "9", "Name": "Rent", "AccountType": "Expense",
                "SubAccount": true, "ParentRef": {"value": "10"}
            })),
            account(json!({"Id": "10", "Name": "Premises", "AccountType": "Expense"})),
        ]);
        harness.chart = chart;
        with_roots(&harness).await;

        // Child before parent: fails until the group exists.
        assert_eq!(ordered[0].id, "9");
        let err = save_account(&harness.ctx(), &ordered[0]).await.unwrap_err();
        assert!(matches!(err, TransformError::MissingReference { .. }));

        let outcome = save_account(&harness.ctx(), &ordered[1]).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Created(vec!["Premises - QB - AL".into(), "Premises - 1 - QB - AL".into()])
        );
        let group = stored_account(&harness, "Group - 10").await;
        assert!(group.is_group);
        let leaf = stored_account(&harness, "10").await;
        assert_eq!(leaf.parent_account.as_deref(), Some("Premises - QB - AL"));

        save_account(&harness.ctx(), &ordered[0]).await.unwrap();
        let rent = stored_account(&harness, "9").await;
        assert_eq!(rent.parent_account.as_deref(), Some("Premises - QB - AL"));
    }

    #[tokio::test]
    async fn test_existing_account_is_not_recreated() {
        let harness = Harness::new();
        with_roots(&harness).await;
        let cash = account(json!({"Id": "4", "Name": "Cash", "AccountType": "Bank"}));

        save_account(&harness.ctx(), &cash).await.unwrap();
        let again = save_account(&harness.ctx(), &cash).await.unwrap();

        assert_eq!(again, Outcome::AlreadyImported);
        assert_eq!(harness.store.count(DocType::Account), 6);
    }

    #[test]
    fn test_prepare_orders_numerically() {
        let (chart, ordered) = AccountChart::prepare(vec![
            account(json!({"Id": "100", "Name": "B", "AccountType": "Bank"})),
            account(json!({"Id": "20", "Name": "A", "AccountType": "Bank"})),
        ]);
        let ids: Vec<_> = ordered.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["20", "100"]);
        assert!(!chart.is_group("20"));
        assert_eq!(chart.display_names().count(), 2);
    }
}
