//! Shared types, errors, and configuration for Tallybridge.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for persisted records
//! - Query windows for paginated QuickBooks reads
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
