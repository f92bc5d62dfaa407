/// Metadata Extraction Layer
///
/// This module turns raw workflow JSON into fully classified catalog records:
/// - Single-pass node feature extraction (analyzer)
/// - Rule-table categorization, tags, use cases, difficulty (classifier)
/// - Requirements derivation and compatibility scoring (compat)
/// - Record assembly with identifiers and timestamps (WorkflowParser)

// Single-pass node feature extraction
pub mod analyzer;

// Pure classification heuristics over name/description/features
pub mod classifier;

// Requirements derivation and offline-compatibility scoring
pub mod compat;

use crate::catalog::types::{
    RawWorkflow, WorkflowMetadata, WorkflowRecord, WorkflowStats,
};
use anyhow::{Context, Result};

/// Parser that assembles immutable catalog records from raw workflow JSON
///
/// Parse failures for a single document are ordinary errors: the ingestion
/// pipeline logs them and continues the batch, they are never batch-fatal.
#[derive(Debug, Clone, Default)]
pub struct WorkflowParser;

impl WorkflowParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one workflow document and build its catalog record
    ///
    /// `file_stem` names the workflow when the document has no name field.
    /// `source_repo` is "owner/name"; the author is its first path segment.
    /// created_at and updated_at are stamped from a single instant;
    /// source_url stays unset until the ingestion pipeline fills it in from
    /// the repository listing.
    pub fn parse_workflow(
        &self,
        raw_json: &str,
        file_stem: &str,
        source_repo: &str,
        json_path: &str,
    ) -> Result<WorkflowRecord> {
        let workflow: RawWorkflow = serde_json::from_str(raw_json)
            .with_context(|| format!("malformed workflow document: {}", json_path))?;

        let name = workflow
            .name
            .clone()
            .unwrap_or_else(|| file_stem.to_string());
        let description = classifier::extract_description(&workflow);

        let features = analyzer::analyze_nodes(&workflow.nodes);

        let (category, subcategory) =
            classifier::categorize(&name, description.as_deref(), &features);
        let difficulty = classifier::determine_difficulty(&features);
        let tags = classifier::extract_tags(&workflow, &name, description.as_deref(), &features);
        let department = classifier::determine_department(&category);
        let use_cases = classifier::extract_use_cases(&name, description.as_deref());
        let estimated_runtime = classifier::estimate_runtime(&features);

        let requirements = compat::extract_requirements(&features);
        let mut compatibility = compat::analyze_compatibility(&requirements, &features);
        // Status and pozi_compatible were derived from the raw score above;
        // the persisted field itself must stay within [0,1].
        compatibility.compatibility_score = compatibility.compatibility_score.clamp(0.0, 1.0);

        let now = chrono::Utc::now().to_rfc3339();

        Ok(WorkflowRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            category,
            subcategory: Some(subcategory),
            difficulty,
            author: Some(extract_author(source_repo)),
            source_repo: source_repo.to_string(),
            source_url: None,
            json_path: json_path.to_string(),
            tags,
            department,
            use_cases,
            metadata: WorkflowMetadata {
                node_count: workflow.nodes.len(),
                integrations: features.integrations.clone(),
                node_types: features.node_types.clone(),
                has_webhook: features.has_webhook,
                has_schedule: features.has_schedule,
                estimated_runtime: Some(estimated_runtime),
            },
            requirements,
            compatibility,
            stats: WorkflowStats::default(),
            created_at: now.clone(),
            updated_at: now,
            last_synced: None,
        })
    }
}

/// Author is the owner segment of an "owner/name" repository identifier
fn extract_author(source_repo: &str) -> String {
    source_repo
        .split('/')
        .next()
        .unwrap_or(source_repo)
        .to_string()
}
