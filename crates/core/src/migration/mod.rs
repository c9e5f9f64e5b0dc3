//! Orchestration of a QuickBooks migration run.
//!
//! This module implements the run loop:
//! - The [`QuickBooksApi`] seam the HTTP client implements
//! - Paginated fetching of every record of an entity
//! - Progress events for the UI
//! - Connector state (tokens, status, discovered defaults)
//! - The [`MigrationRunner`] driving every phase in order

pub mod api;
pub mod error;
pub mod fetch;
pub mod progress;
pub mod runner;
pub mod state;

pub use api::QuickBooksApi;
pub use error::{BoxError, MigrationError};
pub use fetch::fetch_all;
pub use progress::{BroadcastProgress, NoopProgress, ProgressEvent, ProgressSink};
pub use runner::{MigrationRunner, RunSummary, extend_fiscal_years, recover_interrupted_run};
pub use state::{
    ConnectorDefaults, ConnectorState, ConnectorStatus, ConnectorStore, MemoryConnectorStore,
};
