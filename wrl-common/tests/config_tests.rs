//! Unit tests for configuration loading and resolution
//!
//! Tests that manipulate WRL_* environment variables are marked #[serial]
//! so they do not race each other.

use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wrl_common::config::{
    resolve_config_path, StorageBackend, TomlConfig, ENV_CONFIG, ENV_ENTRIES_PATH,
    ENV_OMDB_API_KEY, ENV_SPOTIFY_CLIENT_ID, ENV_SPOTIFY_CLIENT_SECRET,
};
use wrl_common::Error;

fn clear_env() {
    for name in [
        ENV_CONFIG,
        ENV_ENTRIES_PATH,
        ENV_OMDB_API_KEY,
        ENV_SPOTIFY_CLIENT_ID,
        ENV_SPOTIFY_CLIENT_SECRET,
    ] {
        env::remove_var(name);
    }
}

#[test]
fn test_defaults() {
    let config = TomlConfig::default();
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.server.bind, "127.0.0.1");
    assert_eq!(config.storage.backend, StorageBackend::Json);
    assert_eq!(config.storage.path, PathBuf::from("entries.json"));
    assert_eq!(config.logging.level, "info");
    assert!(config.search_timeout().is_none());
    assert!(config.providers.omdb.api_key.is_none());
    assert_eq!(config.providers.open_library.limit, 20);
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = TomlConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.server.port, 8000);
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server\nport = ").unwrap();

    assert!(matches!(TomlConfig::load(&path), Err(Error::Config(_))));
}

#[test]
fn test_partial_file_fills_defaults() {
    let config = TomlConfig::from_toml_str(
        r#"
        [server]
        port = 9001

        [storage]
        backend = "sqlite"
        path = "/var/lib/wrl/wrl.db"

        [search]
        timeout_secs = 5

        [providers.omdb]
        api_key = "omdb-key"

        [providers.spotify]
        client_id = "id"
        client_secret = "secret"
        "#,
    )
    .unwrap();

    assert_eq!(config.server.port, 9001);
    assert_eq!(config.server.bind, "127.0.0.1");
    assert_eq!(config.storage.backend, StorageBackend::Sqlite);
    assert_eq!(config.storage.path, Path::new("/var/lib/wrl/wrl.db"));
    assert_eq!(config.search_timeout(), Some(Duration::from_secs(5)));
    assert_eq!(config.providers.omdb.api_key.as_deref(), Some("omdb-key"));
    assert_eq!(config.providers.omdb.base_url, "https://www.omdbapi.com");
    assert_eq!(config.providers.spotify.client_secret.as_deref(), Some("secret"));
    assert_eq!(
        config.providers.spotify.token_url,
        "https://accounts.spotify.com/api/token"
    );
}

#[test]
fn test_blank_file_credentials_are_unset() {
    let config = TomlConfig::from_toml_str(
        r#"
[providers.omdb]
api_key = ""

[providers.spotify]
client_id = "id"
client_secret = "   "
"#,
    )
    .unwrap();

    assert_eq!(config.providers.omdb.api_key, None);
    assert_eq!(config.providers.spotify.client_id.as_deref(), Some("id"));
    assert_eq!(config.providers.spotify.client_secret, None);
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
    clear_env();
    let mut config = TomlConfig::from_toml_str(
        r#"
        [providers.omdb]
        api_key = "from-file"
        "#,
    )
    .unwrap();

    env::set_var(ENV_OMDB_API_KEY, "from-env");
    env::set_var(ENV_SPOTIFY_CLIENT_ID, "env-id");
    env::set_var(ENV_SPOTIFY_CLIENT_SECRET, "env-secret");
    env::set_var(ENV_ENTRIES_PATH, "/tmp/wrl-env-entries.json");

    config.apply_env_overrides();

    assert_eq!(config.providers.omdb.api_key.as_deref(), Some("from-env"));
    assert_eq!(config.providers.spotify.client_id.as_deref(), Some("env-id"));
    assert_eq!(config.providers.spotify.client_secret.as_deref(), Some("env-secret"));
    assert_eq!(config.storage.path, PathBuf::from("/tmp/wrl-env-entries.json"));

    clear_env();
}

#[test]
#[serial]
fn test_blank_env_value_ignored() {
    clear_env();
    let mut config = TomlConfig::from_toml_str(
        r#"
        [providers.omdb]
        api_key = "from-file"
        "#,
    )
    .unwrap();

    env::set_var(ENV_OMDB_API_KEY, "   ");
    config.apply_env_overrides();
    assert_eq!(config.providers.omdb.api_key.as_deref(), Some("from-file"));

    clear_env();
}

#[test]
#[serial]
fn test_config_path_priority() {
    clear_env();

    // CLI argument wins
    env::set_var(ENV_CONFIG, "/tmp/wrl-env.toml");
    let cli = PathBuf::from("/tmp/wrl-cli.toml");
    assert_eq!(resolve_config_path(Some(&cli)), cli);

    // Then the environment
    assert_eq!(resolve_config_path(None), PathBuf::from("/tmp/wrl-env.toml"));

    // Then a file name ending in config.toml
    env::remove_var(ENV_CONFIG);
    assert!(resolve_config_path(None).ends_with("config.toml"));

    clear_env();
}
