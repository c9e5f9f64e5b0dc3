//! Core migration logic for Tallybridge.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! QuickBooks access and document persistence sit behind traits implemented by
//! the `quickbooks` and `db` crates.
//!
//! # Modules
//!
//! - `source` - Typed QuickBooks Online entities
//! - `ledger` - General Ledger reconstruction and journal synthesis
//! - `document` - Target ERP documents and their store
//! - `transform` - Per-entity transformers
//! - `fiscal` - Fiscal year extension
//! - `migration` - Paginated fetching, connector state and the migration run

pub mod document;
pub mod fiscal;
pub mod ledger;
pub mod migration;
pub mod settings;
pub mod source;
pub mod transform;

pub use settings::CompanySettings;
