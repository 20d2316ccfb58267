//! Open Library book catalog client
//!
//! Uses the public `search.json` endpoint; no credentials required.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wrl_common::config::OpenLibraryConfig;
use wrl_common::MediaType;

use super::{build_http_client, check_status, trim_base_url, CatalogItem, CatalogProvider, ProviderError};

const OPEN_LIBRARY_SITE: &str = "https://openlibrary.org";
const COVERS_BASE_URL: &str = "https://covers.openlibrary.org/b/id";

/// Book (work) search result
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Book {
    /// Work key, e.g. `/works/OL893415W`
    pub key: String,
    pub title: String,
    #[serde(rename = "author_name", default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub first_publish_year: Option<i32>,
    #[serde(rename = "cover_i", default)]
    pub cover_id: Option<i64>,
}

impl Book {
    /// Authors joined for display
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }
}

impl CatalogItem for Book {
    fn title(&self) -> &str {
        &self.title
    }

    fn set_title(&mut self, title: String) {
        self.title = title;
    }

    fn link(&self) -> String {
        format!("{}{}", OPEN_LIBRARY_SITE, self.key)
    }

    fn image_url(&self) -> Option<String> {
        self.cover_id
            .map(|id| format!("{}/{}-M.jpg", COVERS_BASE_URL, id))
    }

    fn media_type(&self) -> MediaType {
        MediaType::Book
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<Book>,
}

/// Open Library search client
pub struct OpenLibraryClient {
    http_client: reqwest::Client,
    base_url: String,
    limit: u32,
}

impl OpenLibraryClient {
    pub fn new(config: &OpenLibraryConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: build_http_client()?,
            base_url: trim_base_url(&config.base_url),
            limit: config.limit,
        })
    }
}

#[async_trait]
impl CatalogProvider for OpenLibraryClient {
    type Item = Book;

    fn name(&self) -> &'static str {
        "open_library"
    }

    async fn search(&self, query: &str) -> Result<Vec<Book>, ProviderError> {
        tracing::debug!(query = %query, "Querying Open Library API");

        let limit = self.limit.to_string();
        let response = self
            .http_client
            .get(format!("{}/search.json", self.base_url))
            .query(&[
                ("q", query),
                ("limit", limit.as_str()),
                ("fields", "key,title,author_name,first_publish_year,cover_i"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let body: SearchResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(body.docs)
    }
}
