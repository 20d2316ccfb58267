//! Saved entry endpoints (JSON) and the shared save-form validation

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use wrl_common::{MediaType, NewEntry, SavedEntry};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Fields posted by a result card's save form (or sent as JSON)
#[derive(Debug, Deserialize)]
pub struct SaveForm {
    pub title: String,
    pub link: String,
    pub media_type: String,
    #[serde(default)]
    pub image_url: String,
}

impl SaveForm {
    /// Validate the media type tag, link and image URL
    ///
    /// The link must be an absolute `http`/`https` URL. An empty image URL
    /// is accepted (not every item has artwork); a non-empty one must meet
    /// the same rule as the link.
    pub fn into_new_entry(self) -> ApiResult<NewEntry> {
        let media_type: MediaType = self.media_type.parse()?;

        let link = web_url("link", &self.link)?;
        let image_url = match self.image_url.trim() {
            "" => String::new(),
            url => web_url("image_url", url)?,
        };

        Ok(NewEntry {
            title: self.title,
            link,
            image_url,
            media_type,
        })
    }
}

/// Accept only absolute http(s) URLs; they end up in `href` and `src`
fn web_url(field: &str, value: &str) -> ApiResult<String> {
    let value = value.trim();
    let url = reqwest::Url::parse(value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {}: {}", field, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(value.to_string()),
        scheme => Err(ApiError::BadRequest(format!(
            "Invalid {}: scheme {:?} not allowed",
            field, scheme
        ))),
    }
}

/// GET /api/entries
pub async fn list_entries(State(state): State<AppState>) -> ApiResult<Json<Vec<SavedEntry>>> {
    Ok(Json(state.store.list_all().await?))
}

/// POST /api/entries
pub async fn create_entry(
    State(state): State<AppState>,
    Json(form): Json<SaveForm>,
) -> ApiResult<(StatusCode, Json<SavedEntry>)> {
    let saved = state.store.append(form.into_new_entry()?).await?;
    tracing::info!(id = %saved.id, media_type = %saved.media_type, "Entry saved");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// DELETE /api/entries/:id
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.store.remove(&id).await? {
        tracing::info!(id = %id, "Entry removed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("entry {}", id)))
    }
}

/// Build saved entry routes
pub fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/api/entries", get(list_entries).post(create_entry))
        .route("/api/entries/:id", delete(delete_entry))
}
