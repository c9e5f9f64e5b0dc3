//! Initial schema: connector record, migrated documents, fiscal years.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS naming_series, fiscal_years, erp_documents, connectors CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- Singleton QuickBooks connector record
CREATE TABLE connectors (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    realm_id VARCHAR(64),
    access_token TEXT,
    refresh_token TEXT,
    status VARCHAR(32) NOT NULL DEFAULT 'Not Connected',
    undeposited_funds_account VARCHAR(255),
    shipping_account VARCHAR(255),
    last_synced_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_connector_status CHECK (status IN (
        'Not Connected', 'Connecting to QuickBooks', 'Connected to QuickBooks',
        'In Progress', 'Complete', 'Failed'
    ))
);

-- Migrated ERP documents, payload stored as JSON
CREATE TABLE erp_documents (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    doctype VARCHAR(32) NOT NULL,
    name VARCHAR(255) NOT NULL,
    quickbooks_id VARCHAR(255),
    company VARCHAR(255) NOT NULL,
    payload JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_erp_documents_name UNIQUE (doctype, name)
);

-- Idempotency key: one document per QuickBooks record and company
CREATE UNIQUE INDEX uq_erp_documents_key
    ON erp_documents(doctype, quickbooks_id, company)
    WHERE quickbooks_id IS NOT NULL;

CREATE INDEX idx_erp_documents_company ON erp_documents(doctype, company, created_at);

-- Fiscal years never overlap
CREATE EXTENSION IF NOT EXISTS btree_gist;

CREATE TABLE fiscal_years (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    year VARCHAR(16) NOT NULL UNIQUE,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_fiscal_year_dates CHECK (start_date < end_date),
    CONSTRAINT ex_fiscal_year_overlap EXCLUDE USING gist (daterange(start_date, end_date, '[]') WITH &&)
);

-- Counters behind SINV/PINV/JV document names
CREATE TABLE naming_series (
    prefix VARCHAR(16) PRIMARY KEY,
    current BIGINT NOT NULL DEFAULT 0
);
";
