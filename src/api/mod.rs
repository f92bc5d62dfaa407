/// HTTP API Layer
///
/// This module provides the read-only REST endpoints over the catalog:
/// - Workflow listing, search, and lookup
/// - Popular and locally-compatible shortlists
/// - Category aggregates

// Workflow query endpoints
pub mod workflows;

// Category listing endpoint
pub mod categories;

// Re-export router builders
pub use categories::create_category_routes;
pub use workflows::create_workflow_routes;
