//! JSON search endpoints

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::search::ResultBundle;
use crate::AppState;

/// Query parameters for `GET /api/search`
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/search/:query
///
/// Returns the joined bundle once every provider has answered or failed.
/// A failed provider contributes an empty list and an entry in `errors`.
pub async fn search_by_path(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> ApiResult<Json<ResultBundle>> {
    run_search(&state, query).await
}

/// GET /api/search?q=...
pub async fn search_by_param(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<ResultBundle>> {
    run_search(&state, params.q).await
}

async fn run_search(state: &AppState, query: String) -> ApiResult<Json<ResultBundle>> {
    if query.trim().is_empty() {
        return Err(ApiError::BadRequest("Empty search query".to_string()));
    }
    Ok(Json(state.aggregator.search(&query).await))
}

/// Build JSON search routes
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/api/search", get(search_by_param))
        .route("/api/search/:query", get(search_by_path))
}
