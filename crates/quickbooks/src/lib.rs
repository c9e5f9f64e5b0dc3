//! QuickBooks Online access for Tallybridge.
//!
//! - `oauth` - Authorization URL, code exchange and token refresh
//! - `token` - Token persistence and the refresh-once request wrapper
//! - `client` - [`QuickBooksApi`](tallybridge_core::migration::QuickBooksApi)
//!   over the query and reports endpoints

pub mod client;
pub mod error;
pub mod oauth;
pub mod token;

pub use client::QuickBooksClient;
pub use error::QuickBooksError;
pub use oauth::{OAuthClient, TokenSet};
pub use token::{MAX_REFRESH_ATTEMPTS, TokenManager};
