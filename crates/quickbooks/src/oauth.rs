//! OAuth2 authorization code flow against Intuit.

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use tallybridge_shared::config::QuickBooksConfig;
use tracing::debug;

use crate::error::{QuickBooksError, fault_message};

/// Tokens returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenSet {
    /// Bearer token for API calls.
    pub access_token: String,
    /// Token used to obtain the next access token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Refresh token lifetime in seconds.
    #[serde(default)]
    pub x_refresh_token_expires_in: Option<i64>,
}

/// Stateless client for the consent page and the token endpoint.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    config: QuickBooksConfig,
}

impl OAuthClient {
    /// Creates a client for the configured application.
    #[must_use]
    pub fn new(http: Client, config: QuickBooksConfig) -> Self {
        Self { http, config }
    }

    /// Consent page URL the user is redirected to.
    pub fn authorization_url(&self, state: &str) -> Result<String, QuickBooksError> {
        let endpoint = &self.config.authorization_endpoint;
        let url = Url::parse_with_params(
            endpoint,
            [
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("scope", self.config.scope.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| QuickBooksError::InvalidEndpoint {
            url: endpoint.clone(),
            message: e.to_string(),
        })?;
        Ok(url.into())
    }

    /// Exchanges an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, QuickBooksError> {
        debug!("Exchanging authorization code");
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_url.as_str()),
        ])
        .await
    }

    /// Obtains a new access token. Intuit may rotate the refresh token too.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, QuickBooksError> {
        debug!("Refreshing access token");
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenSet, QuickBooksError> {
        let response = self
            .http
            .post(&self.config.token_endpoint)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(QuickBooksError::TokenRequest {
                status: status.as_u16(),
                message: fault_message(&body, status.as_u16()),
            });
        }

        response
            .json()
            .await
            .map_err(|e| QuickBooksError::InvalidResponse(e.to_string()))
    }
}
