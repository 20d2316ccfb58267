//! Configuration loading and resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (handled by the binary)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! A missing config file is not fatal: compiled defaults are used. A config
//! file that exists but cannot be parsed is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming the config file
pub const ENV_CONFIG: &str = "WRL_CONFIG";
/// Environment variable overriding the OMDb API key
pub const ENV_OMDB_API_KEY: &str = "WRL_OMDB_API_KEY";
/// Environment variable overriding the Spotify client ID
pub const ENV_SPOTIFY_CLIENT_ID: &str = "WRL_SPOTIFY_CLIENT_ID";
/// Environment variable overriding the Spotify client secret
pub const ENV_SPOTIFY_CLIENT_SECRET: &str = "WRL_SPOTIFY_CLIENT_SECRET";
/// Environment variable overriding the entries path
pub const ENV_ENTRIES_PATH: &str = "WRL_ENTRIES_PATH";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub search: SearchConfig,
    pub providers: ProvidersConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub bind: String,
    /// HTTP port (default 8000)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Persistence backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Single JSON array file
    #[default]
    Json,
    /// SQLite `entries` table
    Sqlite,
}

/// Entry storage settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// JSON file path or SQLite database path, depending on backend
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            path: PathBuf::from("entries.json"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Search fan-out settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Overall deadline for one search across all providers.
    /// Unset means a search waits for every provider indefinitely.
    pub timeout_secs: Option<u64>,
}

/// Credentials and endpoints for the three catalogs
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub omdb: OmdbConfig,
    pub open_library: OpenLibraryConfig,
    pub spotify: SpotifyConfig,
}

/// OMDb (movie catalog)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OmdbConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://www.omdbapi.com".to_string(),
        }
    }
}

/// Open Library (book catalog, no credentials)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OpenLibraryConfig {
    pub base_url: String,
    /// Maximum number of results requested
    pub limit: u32,
}

impl Default for OpenLibraryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openlibrary.org".to_string(),
            limit: 20,
        }
    }
}

/// Spotify (music catalog, client-credentials flow)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base: String,
    pub token_url: String,
    /// Maximum number of albums requested
    pub limit: u32,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_base: "https://api.spotify.com/v1".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            limit: 20,
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.drop_blank_credentials();
        Ok(config)
    }

    /// Blank credentials count as not configured
    fn drop_blank_credentials(&mut self) {
        let omdb = &mut self.providers.omdb;
        omdb.api_key = omdb.api_key.take().filter(|k| is_valid_key(k));
        let spotify = &mut self.providers.spotify;
        spotify.client_id = spotify.client_id.take().filter(|k| is_valid_key(k));
        spotify.client_secret = spotify.client_secret.take().filter(|k| is_valid_key(k));
    }

    /// Load configuration from `path`
    ///
    /// Missing file: compiled defaults (the caller decides how to report it).
    /// Unreadable or malformed file: error.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::Config(format!(
                "Read config {} failed: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Apply environment variable overrides (tier 2) on top of file values
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = env_value(ENV_OMDB_API_KEY) {
            info!("OMDb API key loaded from environment variable");
            self.providers.omdb.api_key = Some(key);
        }
        if let Some(id) = env_value(ENV_SPOTIFY_CLIENT_ID) {
            self.providers.spotify.client_id = Some(id);
        }
        if let Some(secret) = env_value(ENV_SPOTIFY_CLIENT_SECRET) {
            info!("Spotify credentials loaded from environment variables");
            self.providers.spotify.client_secret = Some(secret);
        }
        if let Some(path) = env_value(ENV_ENTRIES_PATH) {
            self.storage.path = PathBuf::from(path);
        }
    }

    /// Search deadline, if configured
    pub fn search_timeout(&self) -> Option<std::time::Duration> {
        self.search.timeout_secs.map(std::time::Duration::from_secs)
    }
}

/// Resolve the config file path: CLI argument, then `WRL_CONFIG`, then
/// `./config.toml` if present, then the platform config directory.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Some(path) = env_value(ENV_CONFIG) {
        return PathBuf::from(path);
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }

    dirs::config_dir()
        .map(|d| d.join("wrl").join(CONFIG_FILE_NAME))
        .unwrap_or(local)
}

/// Validate credential text (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| is_valid_key(v))
}
