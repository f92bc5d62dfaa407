/// Category listing endpoint
///
/// Categories are a derived view: distinct category names with live record
/// counts, recomputed on every read, ordered by name ascending.

use crate::api::workflows::AppState;
use crate::catalog::types::CategoryCount;
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};

pub fn create_category_routes() -> Router<AppState> {
    Router::new().route("/api/categories", get(list_categories))
}

/// List all workflow categories with counts
///
/// GET /api/categories
/// Returns: [{ "name": "...", "slug": "...", "workflow_count": N }]
async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryCount>>, StatusCode> {
    match state.store.list_categories().await {
        Ok(categories) => Ok(Json(categories)),
        Err(e) => {
            tracing::error!("Failed to list categories: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
