//! SQLite backend

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::path::Path;

use super::{validate, EntryStore};
use crate::entry::{MediaType, NewEntry, SavedEntry};
use crate::{uuid_utils, Error, Result};

/// Entry store backed by an `entries` table
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the table exists
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // mode=rwc: read, write, create
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        tracing::debug!("Connecting to database: {}", db_url);

        let pool = SqlitePool::connect(&db_url).await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool (used with `:memory:` in tests)
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        init_tables(&pool).await?;
        Ok(Self { pool })
    }
}

async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            link TEXT NOT NULL,
            image_url TEXT NOT NULL DEFAULT '',
            media_type TEXT NOT NULL,
            saved_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (entries)");
    Ok(())
}

fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<SavedEntry> {
    let media_type: String = row.try_get("media_type")?;
    let saved_at: String = row.try_get("saved_at")?;
    let saved_at = DateTime::parse_from_rfc3339(&saved_at)
        .map_err(|e| Error::Internal(format!("invalid saved_at {:?}: {}", saved_at, e)))?
        .with_timezone(&Utc);

    Ok(SavedEntry {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        link: row.try_get("link")?,
        image_url: row.try_get("image_url")?,
        media_type: media_type
            .parse::<MediaType>()
            .map_err(|_| Error::Internal(format!("unknown media_type {:?}", media_type)))?,
        saved_at,
    })
}

#[async_trait]
impl EntryStore for SqliteStore {
    async fn append(&self, entry: NewEntry) -> Result<SavedEntry> {
        validate(&entry)?;
        let saved = entry.into_saved(uuid_utils::new_entry_id());

        sqlx::query(
            "INSERT INTO entries (id, title, link, image_url, media_type, saved_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&saved.id)
        .bind(&saved.title)
        .bind(&saved.link)
        .bind(&saved.image_url)
        .bind(saved.media_type.as_str())
        .bind(saved.saved_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn list_all(&self) -> Result<Vec<SavedEntry>> {
        let rows = sqlx::query(
            "SELECT id, title, link, image_url, media_type, saved_at
             FROM entries
             ORDER BY rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_entry).collect()
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
