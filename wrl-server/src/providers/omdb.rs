//! OMDb movie catalog client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wrl_common::config::OmdbConfig;
use wrl_common::MediaType;

use super::{build_http_client, check_status, trim_base_url, CatalogItem, CatalogProvider, ProviderError};

/// OMDb answers a search with no hits using this error text
const NOT_FOUND_MESSAGE: &str = "Movie not found!";
const NO_POSTER: &str = "N/A";

/// Movie search result
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Movie {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
}

impl CatalogItem for Movie {
    fn title(&self) -> &str {
        &self.title
    }

    fn set_title(&mut self, title: String) {
        self.title = title;
    }

    fn link(&self) -> String {
        format!("https://www.imdb.com/title/{}/", self.imdb_id)
    }

    fn image_url(&self) -> Option<String> {
        self.poster
            .as_deref()
            .filter(|p| !p.is_empty() && *p != NO_POSTER)
            .map(str::to_string)
    }

    fn media_type(&self) -> MediaType {
        MediaType::Movie
    }
}

/// Raw search response; `Search` is absent when `Response` is "False"
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<Movie>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

/// OMDb API client
pub struct OmdbClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OmdbClient {
    pub fn new(config: &OmdbConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: build_http_client()?,
            base_url: trim_base_url(&config.base_url),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl CatalogProvider for OmdbClient {
    type Item = Movie;

    fn name(&self) -> &'static str {
        "omdb"
    }

    async fn search(&self, query: &str) -> Result<Vec<Movie>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("OMDb API key missing".to_string()))?;

        tracing::debug!(query = %query, "Querying OMDb API");

        let response = self
            .http_client
            .get(format!("{}/", self.base_url))
            .query(&[("apikey", api_key), ("s", query), ("type", "movie")])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let body: SearchResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if body.response.eq_ignore_ascii_case("true") {
            return Ok(body.search);
        }

        match body.error.as_deref() {
            Some(NOT_FOUND_MESSAGE) => Ok(Vec::new()),
            Some("Invalid API key!") => Err(ProviderError::Auth("Invalid API key!".to_string())),
            Some(message) => Err(ProviderError::Api(200, message.to_string())),
            None => Err(ProviderError::Parse("Response=False without Error".to_string())),
        }
    }
}
