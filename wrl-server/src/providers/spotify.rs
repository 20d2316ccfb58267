//! Spotify album catalog client
//!
//! Authenticates with the client-credentials flow. The access token is
//! cached until shortly before it expires; a 401 from the search endpoint
//! drops the cached token so the next search fetches a fresh one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use wrl_common::config::SpotifyConfig;
use wrl_common::MediaType;

use super::{build_http_client, check_status, trim_base_url, CatalogItem, CatalogProvider, ProviderError};

/// Refresh this long before the token's stated expiry
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Album search result
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub external_urls: HashMap<String, String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

impl Album {
    /// Artists joined for display
    pub fn artist_line(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl CatalogItem for Album {
    fn title(&self) -> &str {
        &self.name
    }

    fn set_title(&mut self, title: String) {
        self.name = title;
    }

    fn link(&self) -> String {
        self.external_urls
            .get("spotify")
            .cloned()
            .unwrap_or_else(|| format!("https://open.spotify.com/album/{}", self.id))
    }

    /// Spotify lists images largest first; the last one is the thumbnail
    fn image_url(&self) -> Option<String> {
        self.images.last().map(|i| i.url.clone())
    }

    fn media_type(&self) -> MediaType {
        MediaType::Album
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    albums: AlbumPage,
}

#[derive(Debug, Deserialize)]
struct AlbumPage {
    #[serde(default)]
    items: Vec<Album>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Spotify Web API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    api_base: String,
    token_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    limit: u32,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    pub fn new(config: &SpotifyConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: build_http_client()?,
            api_base: trim_base_url(&config.api_base),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            limit: config.limit,
            token: Mutex::new(None),
        })
    }

    /// Return a valid access token, fetching a new one when needed
    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
            tracing::debug!("Spotify access token expired, refreshing");
        }

        let (client_id, client_secret) = match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => (id, secret),
            _ => {
                return Err(ProviderError::NotConfigured(
                    "Spotify client credentials missing".to_string(),
                ))
            }
        };

        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Auth(error_text));
        }

        let token: TokenResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        let access_token = token.access_token;
        *cached = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        tracing::debug!(expires_in = token.expires_in, "Obtained Spotify access token");
        Ok(access_token)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }
}

#[async_trait]
impl CatalogProvider for SpotifyClient {
    type Item = Album;

    fn name(&self) -> &'static str {
        "spotify"
    }

    async fn search(&self, query: &str) -> Result<Vec<Album>, ProviderError> {
        let token = self.access_token().await?;

        tracing::debug!(query = %query, "Querying Spotify search API");

        let limit = self.limit.to_string();
        let response = self
            .http_client
            .get(format!("{}/search", self.api_base))
            .bearer_auth(&token)
            .query(&[("q", query), ("type", "album"), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.invalidate_token().await;
        }

        let body: SearchResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(body.albums.items)
    }
}
