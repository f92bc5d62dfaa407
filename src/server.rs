/// Server setup and initialization
///
/// Wires together the catalog store and HTTP routes, and provides the main
/// application factory function for creating the Axum app.

use crate::{
    api::{
        categories::create_category_routes,
        workflows::{create_workflow_routes, AppState},
    },
    catalog::store::CatalogStore,
    config::Config,
};
use anyhow::Result;
use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Create the main Axum application with all routes
///
/// Opens the catalog database, ensures the schema exists, and wires the
/// query endpoints onto the shared application state.
pub async fn create_app(config: Config) -> Result<Router> {
    tracing::info!("🗄️ Opening catalog database: {}", config.database.db_path);
    let store = CatalogStore::connect(&config.database.db_path).await?;

    tracing::info!("📋 Ensuring catalog schema exists");
    store.init_schema().await?;

    let app_state = AppState { store };

    tracing::info!("📡 Creating HTTP router with all endpoints");
    let app = Router::new()
        // Health check endpoints
        .route("/healthz", get(health_check))
        .route("/health", get(health_report))
        // Catalog query API routes
        .merge(create_workflow_routes())
        .merge(create_category_routes())
        .with_state(app_state);

    tracing::info!("✅ Application initialized successfully");

    Ok(app)
}

/// Start the HTTP server with the given configuration
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting workflow catalog server...");

    let app = create_app(config.clone()).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}

/// Detailed health report with catalog size
///
/// GET /health
/// Returns: { "status": "...", "version": "...", "database": "...", ... }
async fn health_report(State(state): State<AppState>) -> Json<Value> {
    let (database, workflows_count) = match state.store.count().await {
        Ok(count) => ("connected", count),
        Err(e) => {
            tracing::error!("Health check failed to count workflows: {}", e);
            ("error", 0)
        }
    };

    Json(json!({
        "status": if database == "connected" { "healthy" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "workflows_count": workflows_count,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
