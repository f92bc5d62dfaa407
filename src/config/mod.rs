/// Configuration management for the workflow catalog service
///
/// Handles server binding, database location, and ingestion parameters.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Ingestion configuration
    pub ingest: IngestConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Catalog database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file path (default: "data/workflows.db")
    pub db_path: String,
}

/// Ingestion pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Directory where downloaded workflow JSON is kept
    pub data_dir: String,
    /// Maximum workflows fetched per source repository
    pub max_per_repo: usize,
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("CATALOG_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("CATALOG_PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .unwrap_or(8000),
            },
            database: DatabaseConfig {
                db_path: std::env::var("CATALOG_DB_PATH")
                    .unwrap_or_else(|_| "data/workflows.db".to_string()),
            },
            ingest: IngestConfig {
                data_dir: std::env::var("CATALOG_DATA_DIR")
                    .unwrap_or_else(|_| "data/workflows".to_string()),
                max_per_repo: std::env::var("CATALOG_MAX_PER_REPO")
                    .unwrap_or_else(|_| "50".to_string())
                    .parse()
                    .unwrap_or(50),
            },
        }
    }
}
