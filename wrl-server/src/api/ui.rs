//! HTML page routes
//!
//! `/search/:query` takes the query verbatim from the path (percent-decoded
//! by the router); the home page form submits to `/search?q=` which
//! redirects there.

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use wrl_common::entry::group_by_media_type;

use super::entries::SaveForm;
use super::render;
use super::search::SearchQuery;
use crate::error::ApiResult;
use crate::AppState;

/// Form posted by a saved entry's remove button
#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub id: String,
}

/// GET /
pub async fn home() -> Html<String> {
    Html(render::home_page())
}

/// GET /search?q=...
pub async fn search_redirect(Query(params): Query<SearchQuery>) -> Redirect {
    if params.q.trim().is_empty() {
        return Redirect::to("/");
    }
    Redirect::to(&format!("/search/{}", urlencoding::encode(&params.q)))
}

/// GET /search/:query
pub async fn search_results(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Html<String> {
    let bundle = state.aggregator.search(&query).await;
    Html(render::search_page(&bundle))
}

/// POST /save
pub async fn save(State(state): State<AppState>, Form(form): Form<SaveForm>) -> ApiResult<Redirect> {
    let saved = state.store.append(form.into_new_entry()?).await?;
    tracing::info!(id = %saved.id, media_type = %saved.media_type, "Entry saved");
    Ok(Redirect::to("/list"))
}

/// GET /list
pub async fn list(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let entries = state.store.list_all().await?;
    Ok(Html(render::list_page(&group_by_media_type(entries))))
}

/// POST /remove
///
/// Removing an id that is not in the list is not an error.
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveForm>,
) -> ApiResult<Redirect> {
    if state.store.remove(&form.id).await? {
        tracing::info!(id = %form.id, "Entry removed");
    } else {
        tracing::debug!(id = %form.id, "Remove requested for unknown entry");
    }
    Ok(Redirect::to("/list"))
}

/// Build HTML page routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/search", get(search_redirect))
        .route("/search/:query", get(search_results))
        .route("/save", post(save))
        .route("/list", get(list))
        .route("/remove", post(remove))
}
