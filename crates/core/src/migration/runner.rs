//! The migration run.
//!
//! Phases run strictly in order, each fetching one entity completely before
//! saving it record by record:
//!
//! 1. accounts (after the five root groups)
//! 2. tax rates, then tax codes as lookup data
//! 3. the General Ledger, reconstructed against the imported accounts
//! 4. fiscal years, extended back to the oldest ledger date
//! 5. every other entity in [`EntityKind::ALL`] order
//! 6. transactions only the ledger knows about
//!
//! A failed record is logged with its payload and counted; the run goes on.
//! So is an entity QuickBooks fails to serve. Only a lost connection and
//! storage failures outside a record abort the run.

use std::fmt::Display;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use super::{
    ConnectorDefaults, ConnectorStatus, ConnectorStore, MigrationError, ProgressEvent,
    ProgressSink, QuickBooksApi, fetch_all,
};
use crate::document::{DocType, Document, DocumentStore, RootType, StoreError};
use crate::fiscal::{FiscalYear, extend_to_cover};
use crate::ledger::{AccountIndex, GeneralLedger, reconstruct};
use crate::settings::CompanySettings;
use crate::source::{Account, EntityKind, GlEntryKind, SourceRecord, TaxCode, TaxRate};
use crate::transform::{
    AccountChart, Outcome, TaxTables, TransformContext, TransformError, make_root_account,
    preferences, save_account, save_gl_entry, save_record, tax,
};

/// Tally of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Documents created.
    pub created: usize,
    /// Records whose key already existed.
    pub already_imported: usize,
    /// Records intentionally not migrated.
    pub skipped: usize,
    /// Records that failed.
    pub failed: usize,
    /// Entities that could not be fetched.
    pub failed_entities: usize,
}

impl RunSummary {
    fn record(&mut self, result: &Result<Outcome, TransformError>) {
        match result {
            Ok(Outcome::Created(names)) => self.created += names.len(),
            Ok(Outcome::AlreadyImported) => self.already_imported += 1,
            Ok(Outcome::Skipped(_)) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Drives one migration from QuickBooks into the document store.
#[derive(Clone)]
pub struct MigrationRunner {
    api: Arc<dyn QuickBooksApi>,
    store: Arc<dyn DocumentStore>,
    connector: Arc<dyn ConnectorStore>,
    progress: Arc<dyn ProgressSink>,
    settings: CompanySettings,
    page_size: u32,
}

/// Run-wide lookup state that grows as phases complete.
#[derive(Default)]
struct Lookups {
    defaults: ConnectorDefaults,
    chart: AccountChart,
    tax: TaxTables,
    ledger: GeneralLedger,
}

impl MigrationRunner {
    /// Creates a runner.
    #[must_use]
    pub fn new(
        api: Arc<dyn QuickBooksApi>,
        store: Arc<dyn DocumentStore>,
        connector: Arc<dyn ConnectorStore>,
        progress: Arc<dyn ProgressSink>,
        settings: CompanySettings,
        page_size: u32,
    ) -> Self {
        Self {
            api,
            store,
            connector,
            progress,
            settings,
            page_size,
        }
    }

    /// Claims the connector for a run.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::AlreadyRunning`] while another run is in
    /// progress and [`MigrationError::NotConnected`] without tokens.
    pub async fn start(&self) -> Result<(), MigrationError> {
        let state = self.connector.load().await?;
        if state.status == ConnectorStatus::InProgress {
            return Err(MigrationError::AlreadyRunning);
        }
        if state.access_token.is_none() || state.realm_id.is_none() {
            return Err(MigrationError::NotConnected);
        }
        self.connector.set_status(ConnectorStatus::InProgress).await?;
        Ok(())
    }

    /// Runs every phase on a claimed connector and records the final status.
    pub async fn execute(&self) -> Result<RunSummary, MigrationError> {
        match self.migrate().await {
            Ok(summary) => {
                self.connector.set_status(ConnectorStatus::Complete).await?;
                self.connector.touch_last_synced(Utc::now()).await?;
                info!(
                    created = summary.created,
                    already_imported = summary.already_imported,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    failed_entities = summary.failed_entities,
                    "Migration complete"
                );
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, code = e.error_code(), "Migration failed");
                if let Err(status_error) = self.connector.set_status(ConnectorStatus::Failed).await
                {
                    error!(error = %status_error, "Failed to record failed status");
                }
                Err(e)
            }
        }
    }

    /// [`start`](Self::start) followed by [`execute`](Self::execute).
    pub async fn run(&self) -> Result<RunSummary, MigrationError> {
        self.start().await?;
        self.execute().await
    }

    fn context<'a>(&'a self, lookups: &'a Lookups) -> TransformContext<'a> {
        TransformContext {
            store: self.store.as_ref(),
            settings: &self.settings,
            defaults: &lookups.defaults,
            chart: &lookups.chart,
            tax: &lookups.tax,
            ledger: &lookups.ledger,
        }
    }

    async fn migrate(&self) -> Result<RunSummary, MigrationError> {
        let mut summary = RunSummary::default();
        let mut lookups = Lookups {
            defaults: self.connector.load().await?.defaults,
            ..Lookups::default()
        };

        self.migrate_accounts(&mut lookups, &mut summary).await?;
        self.migrate_taxes(&mut lookups, &mut summary).await?;

        lookups.ledger = self.load_ledger(&lookups.chart).await?;
        if let Err(e) = extend_fiscal_years(self.store.as_ref(), &lookups.ledger).await {
            error!(error = %e, "Failed to extend fiscal years");
        }

        let remaining = EntityKind::ALL.into_iter().filter(|kind| {
            !matches!(
                kind,
                EntityKind::Account | EntityKind::TaxRate | EntityKind::TaxCode
            )
        });
        for kind in remaining {
            let records = self.fetch_entity(kind, &mut summary).await?;
            let total = records.len();
            for (index, value) in records.into_iter().enumerate() {
                self.progress
                    .publish(ProgressEvent::saving(kind.label(), index + 1, total));
                let result = self.save_value(&mut lookups, kind, &value).await;
                log_failure(kind, &value, &result);
                summary.record(&result);
            }
        }

        for kind in GlEntryKind::ALL {
            let entries = lookups.ledger.entries(kind.report_name());
            let total = entries.len();
            for (index, entry) in entries.iter().enumerate() {
                self.progress
                    .publish(ProgressEvent::saving(kind.report_name(), index + 1, total));
                let result = save_gl_entry(&self.context(&lookups), kind, entry).await;
                log_failure(kind, &entry.id, &result);
                summary.record(&result);
            }
        }

        Ok(summary)
    }

    async fn save_value(
        &self,
        lookups: &mut Lookups,
        kind: EntityKind,
        value: &Value,
    ) -> Result<Outcome, TransformError> {
        let record = SourceRecord::parse(kind, value.clone())?;
        if let SourceRecord::Preferences(prefs) = &record {
            let account = preferences::shipping_account(&self.context(lookups), prefs).await?;
            if account.is_some() {
                lookups.defaults.shipping_account = account;
                self.connector.save_defaults(&lookups.defaults).await?;
            }
            return Ok(Outcome::Skipped("preferences are settings"));
        }
        save_record(&self.context(lookups), &record).await
    }

    async fn migrate_accounts(
        &self,
        lookups: &mut Lookups,
        summary: &mut RunSummary,
    ) -> Result<(), MigrationError> {
        for root in RootType::ALL {
            let result = make_root_account(&self.context(lookups), root).await;
            log_failure(EntityKind::Account, &root.as_str(), &result);
            summary.record(&result);
        }

        let kind = EntityKind::Account;
        let accounts: Vec<Account> = self.fetch_parsed(kind, summary).await?;
        let (chart, accounts) = AccountChart::prepare(accounts);
        lookups.chart = chart;

        let total = accounts.len();
        for (index, account) in accounts.iter().enumerate() {
            self.progress
                .publish(ProgressEvent::saving(kind.label(), index + 1, total));
            let result = save_account(&self.context(lookups), account).await;
            log_failure(kind, &account.id, &result);
            summary.record(&result);

            if account.is_undeposited_funds() {
                let found = self
                    .store
                    .find(DocType::Account, &account.id, &self.settings.company)
                    .await?;
                if let Some(stored) = found {
                    lookups.defaults.undeposited_funds_account = Some(stored.name);
                    self.connector.save_defaults(&lookups.defaults).await?;
                }
            }
        }
        Ok(())
    }

    async fn migrate_taxes(
        &self,
        lookups: &mut Lookups,
        summary: &mut RunSummary,
    ) -> Result<(), MigrationError> {
        let kind = EntityKind::TaxRate;
        let rates: Vec<TaxRate> = self.fetch_parsed(kind, summary).await?;
        let total = rates.len();
        for (index, rate) in rates.iter().enumerate() {
            self.progress
                .publish(ProgressEvent::saving(kind.label(), index + 1, total));
            let result = tax::save_tax_rate(&self.context(lookups), rate).await;
            log_failure(kind, &rate.id, &result);
            summary.record(&result);
        }

        let codes: Vec<TaxCode> = self.fetch_parsed(EntityKind::TaxCode, summary).await?;
        lookups.tax = TaxTables::new(rates, codes);
        Ok(())
    }

    /// Fetches every record of `kind`. An entity QuickBooks cannot serve is
    /// logged, counted and yields no records.
    async fn fetch_entity(
        &self,
        kind: EntityKind,
        summary: &mut RunSummary,
    ) -> Result<Vec<Value>, MigrationError> {
        match fetch_all(self.api.as_ref(), kind, self.page_size).await {
            Ok(records) => Ok(records),
            Err(e @ (MigrationError::Api(_) | MigrationError::Payload(_))) => {
                error!(
                    error = %e,
                    code = e.error_code(),
                    entity = %kind,
                    "Failed to fetch entity"
                );
                summary.failed_entities += 1;
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Fetches and parses an entity, counting unparsable records as failed.
    async fn fetch_parsed<T: serde::de::DeserializeOwned>(
        &self,
        kind: EntityKind,
        summary: &mut RunSummary,
    ) -> Result<Vec<T>, MigrationError> {
        let values = self.fetch_entity(kind, summary).await?;
        let mut parsed = Vec::with_capacity(values.len());
        for value in values {
            match serde_json::from_value(value.clone()) {
                Ok(record) => parsed.push(record),
                Err(e) => {
                    error!(error = %e, entity = %kind, payload = %value, "Invalid record");
                    summary.failed += 1;
                }
            }
        }
        Ok(parsed)
    }

    /// Fetches the General Ledger report and reconstructs it. A report that
    /// cannot be fetched or reconstructed yields an empty ledger.
    async fn load_ledger(&self, chart: &AccountChart) -> Result<GeneralLedger, MigrationError> {
        let mut index = AccountIndex::new();
        for stored in self
            .store
            .list(DocType::Account, &self.settings.company)
            .await?
        {
            if let Document::Account(account) = &stored.document
                && let Some(id) = &account.quickbooks_id
            {
                index.insert_account(id.clone(), stored.name.clone());
            }
        }
        for (name, id) in chart.display_names() {
            index.insert_display_name(name, id);
        }

        let report = match self.api.general_ledger().await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Failed to fetch General Ledger");
                return Ok(GeneralLedger::default());
            }
        };
        match reconstruct(&report, &index) {
            Ok(ledger) => {
                info!(
                    accounts = ledger.accounts().len(),
                    lines = ledger.lines().count(),
                    "Reconstructed General Ledger"
                );
                Ok(ledger)
            }
            Err(e) => {
                error!(error = %e, "Failed to reconstruct General Ledger");
                Ok(GeneralLedger::default())
            }
        }
    }
}

fn log_failure(
    kind: impl Display,
    payload: &impl Serialize,
    result: &Result<Outcome, TransformError>,
) {
    if let Err(e) = result {
        let payload = serde_json::to_string(payload).unwrap_or_default();
        error!(
            error = %e,
            code = e.error_code(),
            entity = %kind,
            payload = %payload,
            "Failed to save record"
        );
    }
}

/// Marks a run left `In Progress` by a process that died as `Failed`, so a
/// new run can be started. Returns whether a run was recovered.
pub async fn recover_interrupted_run(
    connector: &dyn ConnectorStore,
) -> Result<bool, StoreError> {
    let state = connector.load().await?;
    if state.status != ConnectorStatus::InProgress {
        return Ok(false);
    }
    warn!("Previous migration did not finish; marking it as failed");
    connector.set_status(ConnectorStatus::Failed).await?;
    Ok(true)
}

/// Prepends fiscal years until the oldest ledger date is covered.
///
/// Skipped with a warning when the store has no fiscal year to extend from
/// or the ledger has no dated line. Returns the created years, newest first.
pub async fn extend_fiscal_years(
    store: &dyn DocumentStore,
    ledger: &GeneralLedger,
) -> Result<Vec<FiscalYear>, StoreError> {
    let Some(earliest) = ledger.earliest_date() else {
        warn!("General Ledger has no dated lines; fiscal years left unchanged");
        return Ok(Vec::new());
    };
    let years = store.fiscal_years().await?;
    let Some(oldest) = years.first() else {
        warn!("No fiscal year to extend from; create one before migrating");
        return Ok(Vec::new());
    };

    let created = extend_to_cover(oldest, earliest)?;
    for year in &created {
        store.insert_fiscal_year(year.clone()).await?;
        info!(year = %year.year, start = %year.start_date, "Created fiscal year");
    }
    Ok(created)
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
