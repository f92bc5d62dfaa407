/// Workflow catalog service entry point
///
/// Starts the HTTP server exposing the catalog query API:
/// - Workflow listing/search at /api/workflows/*
/// - Category aggregates at /api/categories
/// - Health checks at /healthz and /health

use workflow_catalog::{config::Config, server::start_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (defaults to 0.0.0.0:8000 and data/workflows.db)
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
