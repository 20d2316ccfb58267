//! wrl-server library interface
//!
//! Search a movie, a book and a music catalog in one request and keep a
//! personal list of saved items. Exposes the router and state for the
//! binary and for integration testing.

pub mod api;
pub mod error;
pub mod fanout;
pub mod providers;
pub mod search;

pub use crate::error::{ApiError, ApiResult};
pub use crate::search::{ResultBundle, SearchAggregator};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use wrl_common::config::TomlConfig;
use wrl_common::EntryStore;

use crate::providers::{OmdbClient, OpenLibraryClient, ProviderError, SpotifyClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Fan-out search over the three catalogs
    pub aggregator: SearchAggregator,
    /// Saved entry persistence
    pub store: Arc<dyn EntryStore>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(aggregator: SearchAggregator, store: Arc<dyn EntryStore>) -> Self {
        Self {
            aggregator,
            store,
            startup_time: Utc::now(),
        }
    }
}

/// Construct the three provider clients from configuration
pub fn build_aggregator(config: &TomlConfig) -> Result<SearchAggregator, ProviderError> {
    let movies = Arc::new(OmdbClient::new(&config.providers.omdb)?);
    let books = Arc::new(OpenLibraryClient::new(&config.providers.open_library)?);
    let albums = Arc::new(SpotifyClient::new(&config.providers.spotify)?);

    Ok(SearchAggregator::new(movies, books, albums).with_timeout(config.search_timeout()))
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // HTML pages
        .merge(api::ui_routes())
        // JSON API
        .merge(api::search_routes())
        .merge(api::entry_routes())
        .merge(api::health_routes())
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
