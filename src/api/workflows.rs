/// Workflow catalog REST API endpoints
///
/// Read-only projection of the catalog store: listing, full-text search,
/// lookup by id, popular and locally-compatible shortlists. List-valued
/// record fields arrive structured in responses because records are typed
/// in memory; nothing re-parses serialized text here.

use crate::catalog::{
    store::{CatalogStore, SearchFilters},
    types::{DifficultyLevel, WorkflowRecord},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Catalog store for all query operations
    pub store: CatalogStore,
}

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;
const DEFAULT_POPULAR_LIMIT: i64 = 10;
const MAX_POPULAR_LIMIT: i64 = 50;
const DEFAULT_COMPATIBLE_LIMIT: i64 = 20;

/// Paginated workflow list response
#[derive(Debug, Serialize)]
pub struct WorkflowListResponse {
    pub workflows: Vec<WorkflowRecord>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

/// Query parameters for GET /api/workflows
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub category: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    #[serde(default)]
    pub local_ai_only: bool,
    /// Comma-separated tag list; every tag must match exactly
    pub tags: Option<String>,
}

/// Query parameters for GET /api/workflows/search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    #[serde(default)]
    pub local_ai_only: bool,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

/// Query parameters for the popular/compatible shortlists
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Create workflow catalog routes
pub fn create_workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/api/workflows", get(list_workflows))
        .route("/api/workflows/search", get(search_workflows))
        .route("/api/workflows/popular", get(popular_workflows))
        .route("/api/workflows/compatible", get(compatible_workflows))
        .route("/api/workflows/{id}", get(get_workflow))
}

/// List workflows with pagination and filters
///
/// GET /api/workflows?page=1&page_size=20&category=...&difficulty=...&tags=a,b
async fn list_workflows(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<WorkflowListResponse>, StatusCode> {
    let page = params.page.max(1);
    let page_size = params.page_size.clamp(1, MAX_PAGE_SIZE);

    let tags: Vec<String> = params
        .tags
        .as_deref()
        .map(|t| {
            t.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let filters = SearchFilters {
        query: None,
        category: params.category,
        difficulty: params.difficulty,
        local_ai_only: params.local_ai_only,
        tags,
        limit: page_size,
        offset: (page - 1) * page_size,
    };

    let workflows = state.store.search(&filters).await.map_err(|e| {
        tracing::error!("Failed to list workflows: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let total = state.store.count().await.map_err(|e| {
        tracing::error!("Failed to count workflows: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(WorkflowListResponse {
        workflows,
        total,
        page,
        page_size,
    }))
}

/// Full-text search over the catalog
///
/// GET /api/workflows/search?q=...&category=...&difficulty=...
async fn search_workflows(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<WorkflowListResponse>, StatusCode> {
    let page = params.page.max(1);
    let page_size = params.page_size.clamp(1, MAX_PAGE_SIZE);

    let filters = SearchFilters {
        query: params.q,
        category: params.category,
        difficulty: params.difficulty,
        local_ai_only: params.local_ai_only,
        tags: Vec::new(),
        limit: page_size,
        offset: (page - 1) * page_size,
    };

    let workflows = state.store.search(&filters).await.map_err(|e| {
        tracing::error!("Failed to search workflows: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let total = workflows.len() as i64;
    Ok(Json(WorkflowListResponse {
        workflows,
        total,
        page,
        page_size,
    }))
}

/// Most popular workflows
///
/// GET /api/workflows/popular?limit=10
async fn popular_workflows(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<WorkflowListResponse>, StatusCode> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_POPULAR_LIMIT)
        .clamp(1, MAX_POPULAR_LIMIT);

    let filters = SearchFilters {
        limit,
        ..SearchFilters::default()
    };

    let workflows = state.store.search(&filters).await.map_err(|e| {
        tracing::error!("Failed to fetch popular workflows: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let total = workflows.len() as i64;
    Ok(Json(WorkflowListResponse {
        workflows,
        total,
        page: 1,
        page_size: limit,
    }))
}

/// Workflows compatible with the local AI stack
///
/// GET /api/workflows/compatible?limit=20
async fn compatible_workflows(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<WorkflowListResponse>, StatusCode> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_COMPATIBLE_LIMIT)
        .clamp(1, MAX_PAGE_SIZE);

    let filters = SearchFilters {
        local_ai_only: true,
        limit,
        ..SearchFilters::default()
    };

    let workflows = state.store.search(&filters).await.map_err(|e| {
        tracing::error!("Failed to fetch compatible workflows: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let total = workflows.len() as i64;
    Ok(Json(WorkflowListResponse {
        workflows,
        total,
        page: 1,
        page_size: limit,
    }))
}

/// Get a specific workflow by ID
///
/// GET /api/workflows/{id}
async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WorkflowRecord>, StatusCode> {
    match state.store.get_by_id(&id).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get workflow {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
