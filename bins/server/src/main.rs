//! Tallybridge API Server
//!
//! Main entry point for the QuickBooks migration service.

use std::sync::Arc;

use anyhow::Context;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tallybridge_api::{AppState, create_router};
use tallybridge_core::migration::recover_interrupted_run;
use tallybridge_db::migration::Migrator;
use tallybridge_db::{ConnectorRepository, DocumentRepository, connect_with};
use tallybridge_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing; LOG_FORMAT=json switches to structured output
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tallybridge=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f == "json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    Migrator::up(&db, None).await?;
    info!("Database schema is up to date");

    // Create application state
    let documents = Arc::new(DocumentRepository::new(db.clone()));
    let connector = Arc::new(ConnectorRepository::new(db));
    if recover_interrupted_run(connector.as_ref()).await? {
        info!("Connector reset after an interrupted migration");
    }
    let state = AppState::new(&config, documents, connector)?;
    info!(
        company = %config.migration.company,
        page_size = config.migration.page_size,
        "Migration target configured"
    );

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
