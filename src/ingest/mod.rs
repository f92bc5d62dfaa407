/// Ingestion Layer
///
/// Best-effort batch ingestion of workflow JSON files from GitHub
/// repositories: list, download, parse, classify, and insert. Every item
/// yields exactly one IngestOutcome; a failed item is logged and skipped,
/// never batch-fatal.

// GitHub contents API client
pub mod github;

use crate::{
    catalog::store::CatalogStore,
    catalog::types::WorkflowRecord,
    ingest::github::{ContentEntry, GithubClient},
    parser::WorkflowParser,
};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One source repository to ingest from
#[derive(Debug, Clone, Copy)]
pub struct RepoConfig {
    /// "owner/name" repository identifier
    pub repo: &'static str,
    /// Path within the repository holding workflow files ("" = root)
    pub workflows_path: &'static str,
}

/// Repositories the catalog is seeded from
pub const SOURCE_REPOS: &[RepoConfig] = &[
    RepoConfig {
        repo: "Zie619/n8n-workflows",
        workflows_path: "workflows",
    },
    RepoConfig {
        repo: "enescingoz/awesome-n8n-templates",
        // Workflows live in category folders off the repository root
        workflows_path: "",
    },
];

/// Per-item ingestion result
///
/// The aggregator counts outcomes; no outcome unwinds the batch.
#[derive(Debug)]
pub enum IngestOutcome {
    /// Parsed and stored successfully
    Ingested(Box<WorkflowRecord>),
    /// Network/timeout/non-success response; item skipped
    FetchFailure(String),
    /// Malformed or unreadable source JSON; item skipped
    ParseFailure(String),
    /// The catalog store could not commit the record
    StoreWriteFailure(String),
}

/// Aggregated statistics over one ingestion run
#[derive(Debug, Default, Serialize)]
pub struct IngestSummary {
    pub total_workflows: usize,
    pub fetch_failures: usize,
    pub parse_failures: usize,
    pub store_failures: usize,
    pub categories: HashMap<String, usize>,
    pub difficulties: HashMap<String, usize>,
    pub compatibility_statuses: HashMap<String, usize>,
    pub local_ai_workflows: usize,
    pub avg_nodes_per_workflow: f64,
}

impl IngestSummary {
    /// Tally a stream of per-item outcomes into run statistics
    pub fn from_outcomes(outcomes: &[IngestOutcome]) -> Self {
        let mut summary = IngestSummary::default();
        let mut total_nodes = 0usize;

        for outcome in outcomes {
            match outcome {
                IngestOutcome::Ingested(record) => {
                    summary.total_workflows += 1;
                    *summary.categories.entry(record.category.clone()).or_insert(0) += 1;
                    *summary
                        .difficulties
                        .entry(record.difficulty.as_str().to_string())
                        .or_insert(0) += 1;
                    *summary
                        .compatibility_statuses
                        .entry(record.compatibility.status.as_str().to_string())
                        .or_insert(0) += 1;
                    if record.compatibility.local_ai {
                        summary.local_ai_workflows += 1;
                    }
                    total_nodes += record.metadata.node_count;
                }
                IngestOutcome::FetchFailure(_) => summary.fetch_failures += 1,
                IngestOutcome::ParseFailure(_) => summary.parse_failures += 1,
                IngestOutcome::StoreWriteFailure(_) => summary.store_failures += 1,
            }
        }

        if summary.total_workflows > 0 {
            let avg = total_nodes as f64 / summary.total_workflows as f64;
            summary.avg_nodes_per_workflow = (avg * 10.0).round() / 10.0;
        }

        summary
    }
}

/// Ingestion pipeline: GitHub listing -> download -> parse -> store
#[derive(Debug, Clone)]
pub struct WorkflowIngestion {
    client: GithubClient,
    parser: WorkflowParser,
    /// Local directory where downloaded workflow JSON is kept
    data_dir: PathBuf,
}

impl WorkflowIngestion {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            client: GithubClient::new()?,
            parser: WorkflowParser::new(),
            data_dir: data_dir.into(),
        })
    }

    /// Ingest workflows from every configured repository
    pub async fn ingest_all_repos(
        &self,
        store: &CatalogStore,
        max_per_repo: Option<usize>,
    ) -> Vec<IngestOutcome> {
        let mut outcomes = Vec::new();
        for repo_config in SOURCE_REPOS {
            outcomes.extend(self.ingest_repo(store, repo_config, max_per_repo).await);
        }
        outcomes
    }

    /// Ingest workflows from one repository
    ///
    /// A failed top-level listing yields a single FetchFailure outcome for
    /// the repository; individual file failures are skipped and logged.
    pub async fn ingest_repo(
        &self,
        store: &CatalogStore,
        repo_config: &RepoConfig,
        max_workflows: Option<usize>,
    ) -> Vec<IngestOutcome> {
        tracing::info!("📦 Ingesting workflows from {}", repo_config.repo);

        let mut workflow_files =
            match self.collect_workflow_files(repo_config.repo, repo_config.workflows_path).await {
                Ok(files) => files,
                Err(e) => {
                    tracing::warn!("❌ Failed to list {}: {}", repo_config.repo, e);
                    return vec![IngestOutcome::FetchFailure(repo_config.repo.to_string())];
                }
            };

        tracing::info!("Found {} workflow files in {}", workflow_files.len(), repo_config.repo);

        if let Some(max) = max_workflows {
            workflow_files.truncate(max);
        }

        let mut outcomes = Vec::with_capacity(workflow_files.len());
        for (i, file) in workflow_files.iter().enumerate() {
            if (i + 1) % 10 == 0 {
                tracing::info!("Processing workflow {}/{}", i + 1, workflow_files.len());
            }
            outcomes.push(self.ingest_file(store, repo_config.repo, file).await);
        }

        let ingested = outcomes
            .iter()
            .filter(|o| matches!(o, IngestOutcome::Ingested(_)))
            .count();
        tracing::info!("✅ Processed {}/{} workflows from {}", ingested, outcomes.len(), repo_config.repo);

        outcomes
    }

    /// List workflow JSON files, recursing one level into subdirectories
    async fn collect_workflow_files(&self, repo: &str, path: &str) -> Result<Vec<ContentEntry>> {
        let contents = self.client.list_contents(repo, path).await?;

        let mut files = Vec::new();
        for entry in contents {
            if entry.is_file() && entry.name.ends_with(".json") {
                files.push(entry);
            } else if entry.is_dir() {
                // Category folders hold the actual workflow files
                match self.client.list_contents(repo, &entry.path).await {
                    Ok(sub_entries) => {
                        files.extend(
                            sub_entries
                                .into_iter()
                                .filter(|e| e.is_file() && e.name.ends_with(".json")),
                        );
                    }
                    Err(e) => {
                        tracing::warn!("⚠️ Skipping directory {}/{}: {}", repo, entry.path, e);
                    }
                }
            }
        }

        Ok(files)
    }

    /// Ingest a single workflow file: download (or reuse), parse, insert
    async fn ingest_file(
        &self,
        store: &CatalogStore,
        repo: &str,
        file: &ContentEntry,
    ) -> IngestOutcome {
        let repo_name = repo.split('/').next_back().unwrap_or(repo);
        let save_path = self.data_dir.join(repo_name).join(&file.path);

        // Download unless a previous run already fetched this file
        let raw_json = if save_path.exists() {
            match tokio::fs::read_to_string(&save_path).await {
                Ok(contents) => contents,
                Err(e) => {
                    tracing::warn!("❌ Failed to read cached {}: {}", save_path.display(), e);
                    return IngestOutcome::FetchFailure(file.path.clone());
                }
            }
        } else {
            let Some(download_url) = file.download_url.as_deref() else {
                tracing::warn!("❌ No download reference for {}", file.path);
                return IngestOutcome::FetchFailure(file.path.clone());
            };
            match self.client.download(download_url).await {
                Ok(body) => {
                    if let Err(e) = persist_download(&save_path, &body).await {
                        tracing::warn!("⚠️ Failed to cache {}: {}", save_path.display(), e);
                    }
                    body
                }
                Err(e) => {
                    tracing::warn!("❌ Failed to download {}: {}", file.path, e);
                    return IngestOutcome::FetchFailure(file.path.clone());
                }
            }
        };

        let file_stem = Path::new(&file.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&file.name);

        let mut record = match self.parser.parse_workflow(
            &raw_json,
            file_stem,
            repo,
            &save_path.to_string_lossy(),
        ) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("❌ Failed to parse {}: {}", file.path, e);
                return IngestOutcome::ParseFailure(file.path.clone());
            }
        };
        record.source_url = file.html_url.clone();

        match store.insert(&record).await {
            Ok(()) => IngestOutcome::Ingested(Box::new(record)),
            Err(e) => {
                tracing::warn!("❌ Failed to store {}: {}", file.path, e);
                IngestOutcome::StoreWriteFailure(file.path.clone())
            }
        }
    }
}

/// Write a downloaded workflow file to the local data directory
async fn persist_download(save_path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = save_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(save_path, body).await?;
    Ok(())
}
