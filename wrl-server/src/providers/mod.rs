//! Catalog provider clients
//!
//! One client per external catalog:
//! - [`OmdbClient`] - movies (OMDb)
//! - [`OpenLibraryClient`] - books (Open Library)
//! - [`SpotifyClient`] - albums (Spotify Web API)
//!
//! Each exposes a single free-text search through [`CatalogProvider`].
//! Transport, credentials and response parsing stay inside the client.

pub mod omdb;
pub mod open_library;
pub mod spotify;

pub use omdb::{Movie, OmdbClient};
pub use open_library::{Book, OpenLibraryClient};
pub use spotify::{Album, SpotifyClient};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use wrl_common::MediaType;

const USER_AGENT: &str = concat!("wrl-server/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Provider client errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// A single search result item
///
/// Every item has a display title; the remaining accessors feed the save form.
pub trait CatalogItem: Send + Sync + 'static {
    fn title(&self) -> &str;

    fn set_title(&mut self, title: String);

    /// Canonical page for the item at the provider
    fn link(&self) -> String;

    /// Artwork URL, if the provider has one
    fn image_url(&self) -> Option<String>;

    fn media_type(&self) -> MediaType;
}

/// Free-text search against one external catalog
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    type Item: CatalogItem;

    /// Provider name for logs and error attribution
    fn name(&self) -> &'static str;

    /// Search by query. The query is passed to the provider verbatim.
    async fn search(&self, query: &str) -> Result<Vec<Self::Item>, ProviderError>;
}

/// HTTP client shared by all provider clients
pub(crate) fn build_http_client() -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| ProviderError::Network(e.to_string()))
}

/// Map a non-success HTTP response to [`ProviderError::Api`]
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(ProviderError::Auth(error_text));
    }
    Err(ProviderError::Api(status.as_u16(), error_text))
}

/// Remove a trailing slash so paths can be appended with `format!`
pub(crate) fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
