//! Shared harness for transformer tests.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use super::{AccountChart, TaxTables, TransformContext};
use crate::document::{
    AccountDoc, AccountKind, CustomerDoc, Document, DocumentStore, ItemDoc, MemoryStore,
    RootType, SupplierDoc,
};
use crate::ledger::GeneralLedger;
use crate::migration::ConnectorDefaults;
use crate::settings::CompanySettings;

pub struct Harness {
    pub store: MemoryStore,
    pub settings: CompanySettings,
    pub defaults: ConnectorDefaults,
    pub chart: AccountChart,
    pub tax: TaxTables,
    pub ledger: GeneralLedger,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            settings: CompanySettings {
                company: "Acme Ltd".into(),
                abbr: "AL".into(),
                cost_center: "Main - AL".into(),
                warehouse: Some("Stores - AL".into()),
            },
            defaults: ConnectorDefaults::default(),
            chart: AccountChart::default(),
            tax: TaxTables::default(),
            ledger: GeneralLedger::default(),
        }
    }

    pub fn ctx(&self) -> TransformContext<'_> {
        TransformContext {
            store: &self.store,
            settings: &self.settings,
            defaults: &self.defaults,
            chart: &self.chart,
            tax: &self.tax,
            ledger: &self.ledger,
        }
    }

    pub async fn seed_account(
        &self,
        quickbooks_id: &str,
        name: &str,
        kind: Option<AccountKind>,
        currency: Option<&str>,
    ) {
        self.store
            .insert(Document::Account(AccountDoc {
                name: name.into(),
                account_name: name.into(),
                quickbooks_id: Some(quickbooks_id.into()),
                root_type: RootType::Asset,
                account_type: kind,
                account_currency: currency.map(Into::into),
                parent_account: Some("Asset - QB - AL".into()),
                is_group: false,
                company: self.settings.company.clone(),
            }))
            .await
            .unwrap();
    }

    pub async fn seed_customer(&self, quickbooks_id: &str, name: &str, receivable: Option<&str>) {
        self.store
            .insert(Document::Customer(CustomerDoc {
                name: name.into(),
                quickbooks_id: quickbooks_id.into(),
                customer_type: "Individual".into(),
                customer_group: "Commercial".into(),
                territory: "All Territories".into(),
                default_currency: Some("USD".into()),
                receivable_account: receivable.map(Into::into),
                company: self.settings.company.clone(),
            }))
            .await
            .unwrap();
    }

    pub async fn seed_supplier(&self, quickbooks_id: &str, name: &str) {
        self.store
            .insert(Document::Supplier(SupplierDoc {
                name: name.into(),
                quickbooks_id: quickbooks_id.into(),
                supplier_group: "All Supplier Groups".into(),
                company: self.settings.company.clone(),
            }))
            .await
            .unwrap();
    }

    pub async fn seed_item(
        &self,
        quickbooks_id: &str,
        name: &str,
        income: Option<&str>,
        expense: Option<&str>,
    ) {
        self.store
            .insert(Document::Item(ItemDoc {
                name: name.into(),
                quickbooks_id: quickbooks_id.into(),
                item_group: "All Item Groups".into(),
                stock_uom: "Unit".into(),
                is_stock_item: false,
                default_warehouse: None,
                income_account: income.map(Into::into),
                expense_account: expense.map(Into::into),
                company: self.settings.company.clone(),
            }))
            .await
            .unwrap();
    }

    pub async fn journal(&self, key: &str) -> crate::document::JournalEntryDoc {
        let stored = self
            .store
            .find(crate::document::DocType::JournalEntry, key, &self.settings.company)
            .await
            .unwrap()
            .expect("journal entry stored");
        match stored.document {
            Document::JournalEntry(doc) => doc,
            other => panic!("expected journal entry, got {other:?}"),
        }
    }
}

pub fn parse<T: DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
