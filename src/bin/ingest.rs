/// CLI ingestion run: fetch workflows from GitHub and populate the catalog
///
/// Initializes the database, ingests every configured source repository
/// (capped per repo), logs a summary, and writes it next to the downloaded
/// files as ingestion_summary.json.

use anyhow::Result;
use workflow_catalog::{
    catalog::store::CatalogStore,
    config::Config,
    ingest::{IngestSummary, WorkflowIngestion},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let config = Config::default();

    tracing::info!("🚀 Starting workflow ingestion pipeline");

    tracing::info!("📊 Initializing database: {}", config.database.db_path);
    let store = CatalogStore::connect(&config.database.db_path).await?;
    store.init_schema().await?;
    tracing::info!("✅ Database ready");

    let ingestion = WorkflowIngestion::new(&config.ingest.data_dir)?;
    let outcomes = ingestion
        .ingest_all_repos(&store, Some(config.ingest.max_per_repo))
        .await;

    if outcomes.is_empty() {
        tracing::warn!("❌ No workflows found");
        return Ok(());
    }

    let summary = IngestSummary::from_outcomes(&outcomes);

    tracing::info!("📈 Ingestion summary");
    tracing::info!("  Total workflows stored: {}", summary.total_workflows);
    tracing::info!(
        "  Failures: {} fetch, {} parse, {} store",
        summary.fetch_failures,
        summary.parse_failures,
        summary.store_failures
    );
    tracing::info!("  Local AI workflows: {}", summary.local_ai_workflows);
    tracing::info!("  Avg nodes per workflow: {}", summary.avg_nodes_per_workflow);

    let mut categories: Vec<_> = summary.categories.iter().collect();
    categories.sort_by(|a, b| b.1.cmp(a.1));
    for (category, count) in categories {
        tracing::info!("  📂 {}: {}", category, count);
    }
    for (difficulty, count) in &summary.difficulties {
        tracing::info!("  🎯 {}: {}", difficulty, count);
    }
    for (status, count) in &summary.compatibility_statuses {
        tracing::info!("  ✅ {}: {}", status, count);
    }

    let summary_path = std::path::Path::new(&config.ingest.data_dir).join("ingestion_summary.json");
    if let Some(parent) = summary_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&summary_path, serde_json::to_string_pretty(&summary)?).await?;
    tracing::info!("💾 Summary saved to {}", summary_path.display());

    tracing::info!("🎉 Ingestion complete ({} total in catalog)", store.count().await?);

    Ok(())
}
