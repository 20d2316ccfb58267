//! Saved entry persistence
//!
//! Append/list/remove only. Two backends implement [`EntryStore`]:
//! - [`JsonFileStore`]: one JSON array file
//! - [`SqliteStore`]: an `entries` table (requires the `sqlx` feature)

mod json_file;
#[cfg(feature = "sqlx")]
mod sqlite;

pub use json_file::JsonFileStore;
#[cfg(feature = "sqlx")]
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use crate::entry::{NewEntry, SavedEntry};
use crate::{Error, Result};

/// Persistence interface for saved entries
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Store a new entry, returning it with its assigned identifier
    async fn append(&self, entry: NewEntry) -> Result<SavedEntry>;

    /// All entries in insertion order
    async fn list_all(&self) -> Result<Vec<SavedEntry>>;

    /// Delete by identifier. Returns `false` if no entry had that id.
    async fn remove(&self, id: &str) -> Result<bool>;
}

/// Open the store selected by configuration
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn EntryStore>> {
    match config.backend {
        StorageBackend::Json => Ok(Arc::new(JsonFileStore::new(&config.path))),
        #[cfg(feature = "sqlx")]
        StorageBackend::Sqlite => Ok(Arc::new(SqliteStore::open(&config.path).await?)),
        #[cfg(not(feature = "sqlx"))]
        StorageBackend::Sqlite => Err(Error::Config(
            "sqlite backend requires the `sqlx` feature".to_string(),
        )),
    }
}

/// Reject entries without a title or link
pub(crate) fn validate(entry: &NewEntry) -> Result<()> {
    if entry.title.trim().is_empty() {
        return Err(Error::InvalidInput("title must not be empty".to_string()));
    }
    if entry.link.trim().is_empty() {
        return Err(Error::InvalidInput("link must not be empty".to_string()));
    }
    Ok(())
}
