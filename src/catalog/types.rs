/// Core catalog type definitions
///
/// Defines the persisted workflow record and its nested parts, plus the raw
/// serde view of source n8n workflow JSON documents. List-valued fields are
/// typed vectors in memory; they are encoded to JSON text only at the storage
/// boundary (see catalog::store).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Raw n8n workflow document as found in source repositories
///
/// Every field is optional or defaulted so arbitrary community JSON parses
/// leniently. Only the fields the metadata pipeline reads are modeled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWorkflow {
    /// Workflow display name (falls back to the file stem when absent)
    pub name: Option<String>,
    /// Explicit description, when the author provided one
    pub description: Option<String>,
    /// Embedded tags, when present as a list of plain strings or
    /// `{ "name": "..." }` objects; other shapes are ignored
    #[serde(default)]
    pub tags: Value,
    /// Node list; order is preserved but carries no meaning for analysis
    #[serde(default)]
    pub nodes: Vec<RawNode>,
}

/// One node of a raw workflow graph
///
/// Nodes have no identity beyond their position in the source list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNode {
    /// Node type identifier, e.g. "n8n-nodes-base.webhook"
    #[serde(rename = "type", default)]
    pub node_type: String,
    /// Free-form parameter bag
    #[serde(default)]
    pub parameters: Value,
    /// Credential-kind -> credential reference map
    #[serde(default)]
    pub credentials: HashMap<String, Value>,
}

/// Workflow difficulty tier, driven by distinct node-type count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(DifficultyLevel::Beginner),
            "intermediate" => Some(DifficultyLevel::Intermediate),
            "advanced" => Some(DifficultyLevel::Advanced),
            _ => None,
        }
    }
}

/// Compatibility status tier derived from the compatibility score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityStatus {
    FullyCompatible,
    PartiallyCompatible,
    RequiresExternal,
    Incompatible,
}

impl CompatibilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompatibilityStatus::FullyCompatible => "fully_compatible",
            CompatibilityStatus::PartiallyCompatible => "partially_compatible",
            CompatibilityStatus::RequiresExternal => "requires_external",
            CompatibilityStatus::Incompatible => "incompatible",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fully_compatible" => Some(CompatibilityStatus::FullyCompatible),
            "partially_compatible" => Some(CompatibilityStatus::PartiallyCompatible),
            "requires_external" => Some(CompatibilityStatus::RequiresExternal),
            "incompatible" => Some(CompatibilityStatus::Incompatible),
            _ => None,
        }
    }
}

/// Normalized feature set extracted from a workflow's node list
///
/// Derived once per workflow by the node analyzer and never mutated
/// afterward. All string sets are lowercased where noted, deduplicated,
/// and sorted ascending for downstream determinism.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    /// Normalized lowercase integration names (sorted, unique)
    pub integrations: Vec<String>,
    /// Verbatim node type identifiers (sorted, unique)
    pub node_types: Vec<String>,
    /// True if any node type contains "webhook"
    pub has_webhook: bool,
    /// True if any node type contains "schedule" or "cron"
    pub has_schedule: bool,
    /// True if any node type is a known local-AI node
    pub has_local_ai: bool,
    /// Lowercased credential type strings (sorted, unique)
    pub credential_types: Vec<String>,
}

/// One credential requirement entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    /// Lowercased credential type string, e.g. "openaiapi"
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Always true for credentials referenced by the workflow
    pub required: bool,
    /// True iff the type names a known self-hosted service
    pub local: bool,
    pub description: Option<String>,
}

/// Full requirements block for one workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    pub credentials: Vec<Requirement>,
    /// Known local services referenced by credentials (sorted, unique)
    pub services: Vec<String>,
    /// Credential types that point at external APIs (sorted, unique)
    pub external_apis: Vec<String>,
    /// Minimum engine version, defaults to "1.0.0"
    pub min_version: String,
}

/// Offline / local-AI compatibility verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compatibility {
    pub local_ai: bool,
    pub requires_external_api: bool,
    pub works_offline: bool,
    pub pozi_compatible: bool,
    pub status: CompatibilityStatus,
    /// Heuristic score in [0,1]; clamped at the record builder boundary
    pub compatibility_score: f64,
}

/// Structural metadata about the workflow graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    pub node_count: usize,
    pub integrations: Vec<String>,
    pub node_types: Vec<String>,
    pub has_webhook: bool,
    pub has_schedule: bool,
    pub estimated_runtime: Option<String>,
}

/// Usage statistics, the only mutable part of a persisted record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStats {
    pub popularity_score: i64,
    pub import_count: i64,
    pub success_rate: f64,
    pub avg_setup_time: Option<String>,
}

/// The persisted catalog entity for one ingested workflow
///
/// Created once by the record builder at ingestion time. Stats are the only
/// fields mutable post-creation (via CatalogStore::update_stats, which also
/// bumps updated_at). The store exclusively owns the persisted copy; callers
/// receive independent copies on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    /// Globally unique identifier, generated at creation, immutable
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub difficulty: DifficultyLevel,
    pub author: Option<String>,
    /// Source repository in "owner/name" form
    pub source_repo: String,
    pub source_url: Option<String>,
    /// Storage path of the original JSON document
    pub json_path: String,
    /// At most 10 tags, sorted
    pub tags: Vec<String>,
    pub department: Option<String>,
    /// At most 3 use-case labels, in keyword-group declaration order
    pub use_cases: Vec<String>,
    pub metadata: WorkflowMetadata,
    pub requirements: Requirements,
    pub compatibility: Compatibility,
    pub stats: WorkflowStats,
    /// ISO-8601 UTC timestamps; equal on creation
    pub created_at: String,
    pub updated_at: String,
    pub last_synced: Option<String>,
}

/// Category aggregate, recomputed on every read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    /// URL-friendly form: lowercase, " & " and spaces become "-"
    pub slug: String,
    pub workflow_count: i64,
}

impl CategoryCount {
    /// Build a category aggregate, deriving the slug from the name
    pub fn new(name: String, workflow_count: i64) -> Self {
        let slug = name.to_lowercase().replace(" & ", "-").replace(' ', "-");
        Self { name, slug, workflow_count }
    }
}
