//! JSON file backend
//!
//! The whole list is one JSON array. Every mutation is read-modify-write
//! under an async mutex, and the new file is written to a sibling temp file
//! and renamed into place so a crash never leaves a half-written list.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use super::{validate, EntryStore};
use crate::entry::{NewEntry, SavedEntry};
use crate::{uuid_utils, Result};

/// Entry store backed by a single JSON file
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or zero-length file reads as an empty list
    async fn read_entries(&self) -> Result<Vec<SavedEntry>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_entries(&self, entries: &[SavedEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(entries)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl EntryStore for JsonFileStore {
    async fn append(&self, entry: NewEntry) -> Result<SavedEntry> {
        validate(&entry)?;
        let _guard = self.write_lock.lock().await;

        let mut entries = self.read_entries().await?;
        let saved = entry.into_saved(uuid_utils::new_entry_id());
        entries.push(saved.clone());
        self.write_entries(&entries).await?;

        debug!(id = %saved.id, media_type = %saved.media_type, "Entry appended to {}", self.path.display());
        Ok(saved)
    }

    async fn list_all(&self) -> Result<Vec<SavedEntry>> {
        let _guard = self.write_lock.lock().await;
        self.read_entries().await
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.read_entries().await?;
        let before = entries.len();
        entries.retain(|e| e.id != id);

        if entries.len() == before {
            return Ok(false);
        }

        self.write_entries(&entries).await?;
        debug!(id = %id, "Entry removed from {}", self.path.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::MediaType;
    use tempfile::TempDir;

    fn new_entry(title: &str, media_type: MediaType) -> NewEntry {
        NewEntry {
            title: title.to_string(),
            link: format!("https://example.com/{}", title),
            image_url: String::new(),
            media_type,
        }
    }

    #[tokio::test]
    async fn test_missing_file_lists_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("entries.json"));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_length_file_lists_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entries.json");
        std::fs::write(&path, b"").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("entries.json");
        let store = JsonFileStore::new(&path);

        store.append(new_entry("Dune", MediaType::Book)).await.unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("nested/deeper/entries.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entries.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.list_all().await, Err(crate::Error::Json(_))));
    }
}
