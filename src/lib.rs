/// Workflow catalog: discovery service for n8n automation workflows
///
/// This library ingests workflow JSON from public GitHub repositories,
/// derives category/difficulty/tag/compatibility metadata through layered
/// heuristics, and serves the resulting catalog through a searchable
/// SQLite (FTS5) index and a REST API.

// Core configuration and setup
pub mod config;

// Catalog layer - record types and SQLite/FTS5 persistence
pub mod catalog;

// Metadata extraction - node analysis, classification, compatibility scoring
pub mod parser;

// Ingestion pipeline - GitHub fetching and batch processing
pub mod ingest;

// HTTP API layer - read-only catalog query endpoints
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use catalog::{CatalogStore, SearchFilters, WorkflowRecord};
pub use ingest::{IngestOutcome, IngestSummary, WorkflowIngestion};
pub use parser::WorkflowParser;
pub use server::start_server;
