//! Repository abstractions for data access.
//!
//! Repositories implement the core storage traits, hiding the `SeaORM`
//! implementation details from the migration logic.

pub mod connector;
pub mod document;

pub use connector::ConnectorRepository;
pub use document::DocumentRepository;
