/// Catalog Layer
///
/// This module owns the persisted workflow catalog:
/// - Record type definitions (WorkflowRecord and its nested parts)
/// - SQLite persistence with sqlx and an FTS5 full-text index
/// - Filtered, ranked, paginated catalog queries

// Catalog record type definitions
pub mod types;

// SQLite persistence with FTS5 full-text search
pub mod store;

// Re-export commonly used types
pub use store::{CatalogStore, SearchFilters};
pub use types::{
    CategoryCount, Compatibility, CompatibilityStatus, DifficultyLevel, FeatureSet,
    RawNode, RawWorkflow, Requirement, Requirements, WorkflowMetadata, WorkflowRecord,
    WorkflowStats,
};
