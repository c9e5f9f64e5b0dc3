//! `SeaORM` entity definitions.

pub mod connectors;
pub mod erp_documents;
pub mod fiscal_years;
pub mod naming_series;
