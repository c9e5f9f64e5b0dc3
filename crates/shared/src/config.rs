//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// QuickBooks Online application credentials and endpoints.
    pub quickbooks: QuickBooksConfig,
    /// Target company and posting defaults for migrated documents.
    pub migration: MigrationConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bearer token required by the migration control endpoints.
    pub admin_token: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// QuickBooks Online OAuth2 application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct QuickBooksConfig {
    /// OAuth2 client ID issued by Intuit.
    pub client_id: String,
    /// OAuth2 client secret issued by Intuit.
    pub client_secret: String,
    /// Redirect URL registered with Intuit; must point at the callback route.
    pub redirect_url: String,
    /// Space separated OAuth2 scopes.
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Consent page the user is sent to.
    #[serde(default = "default_authorization_endpoint")]
    pub authorization_endpoint: String,
    /// Token endpoint used for code exchange and refresh.
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    /// Accounting API base URL, e.g. `https://quickbooks.api.intuit.com/v3`.
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,
    /// `minorversion` query parameter sent with every API call.
    #[serde(default = "default_minor_version")]
    pub minor_version: u32,
}

fn default_scope() -> String {
    "com.intuit.quickbooks.accounting".to_string()
}

fn default_authorization_endpoint() -> String {
    "https://appcenter.intuit.com/connect/oauth2".to_string()
}

fn default_token_endpoint() -> String {
    "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer".to_string()
}

fn default_api_endpoint() -> String {
    "https://quickbooks.api.intuit.com/v3".to_string()
}

fn default_minor_version() -> u32 {
    3
}

/// Target company and defaults applied to every migrated document.
#[derive(Debug, Clone, Deserialize)]
pub struct MigrationConfig {
    /// Target company name.
    pub company: String,
    /// Company abbreviation appended to unique document names.
    pub company_abbr: String,
    /// Cost center stamped on every posting line.
    pub default_cost_center: String,
    /// Warehouse stamped on invoice items.
    #[serde(default)]
    pub default_warehouse: Option<String>,
    /// Records requested per QuickBooks query page (the API maximum is 1000).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    1000
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLYBRIDGE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    const MINIMAL: &str = r#"
        [server]
        admin_token = "secret"

        [database]
        url = "postgres://localhost/tallybridge"

        [quickbooks]
        client_id = "id"
        client_secret = "shh"
        redirect_url = "http://localhost:8080/api/v1/quickbooks/callback"

        [migration]
        company = "Acme Ltd"
        company_abbr = "AL"
        default_cost_center = "Main - AL"
    "#;

    fn parse(source: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_are_applied() {
        let config = parse(MINIMAL);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.quickbooks.minor_version, 3);
        assert_eq!(config.quickbooks.scope, "com.intuit.quickbooks.accounting");
        assert_eq!(config.migration.page_size, 1000);
        assert!(config.migration.default_warehouse.is_none());
    }

    #[test]
    fn test_missing_credentials_fail() {
        let result = Config::builder()
            .add_source(File::from_str("[server]\nadmin_token = \"x\"", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>();
        assert!(result.is_err());
    }
}
