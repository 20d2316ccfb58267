//! HTTP API handlers for wrl-server
//!
//! - HTML pages: home, search results, saved list (`ui`)
//! - JSON: search bundle, saved entries, health

pub mod entries;
pub mod health;
pub mod render;
pub mod search;
pub mod ui;

pub use entries::entry_routes;
pub use health::health_routes;
pub use search::search_routes;
pub use ui::ui_routes;

use crate::error::ApiError;
use axum::http::Uri;

/// Fallback for unmatched routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
