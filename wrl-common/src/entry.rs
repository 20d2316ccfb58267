//! Saved entry model
//!
//! A saved entry is created when the user saves a search result, listed on the
//! personal list page and deleted by identifier. Entries are never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Media type tag carried by every saved entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Book,
    Album,
}

impl MediaType {
    /// All media types in display order
    pub const ALL: [MediaType; 3] = [MediaType::Movie, MediaType::Book, MediaType::Album];

    /// Wire/storage form (`movie`, `book`, `album`)
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Book => "book",
            MediaType::Album => "album",
        }
    }

    /// Section heading used on the list page
    pub fn label(&self) -> &'static str {
        match self {
            MediaType::Movie => "Movies",
            MediaType::Book => "Books",
            MediaType::Album => "Albums",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" => Ok(MediaType::Movie),
            "book" => Ok(MediaType::Book),
            "album" => Ok(MediaType::Album),
            other => Err(Error::InvalidInput(format!("unknown media type: {:?}", other))),
        }
    }
}

/// Persisted record of a saved search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEntry {
    /// Opaque unique identifier (UUIDv4)
    pub id: String,
    pub title: String,
    pub link: String,
    /// Image reference; empty when the provider had no artwork
    #[serde(default)]
    pub image_url: String,
    pub media_type: MediaType,
    pub saved_at: DateTime<Utc>,
}

/// Entry fields supplied by the user when saving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub image_url: String,
    pub media_type: MediaType,
}

impl NewEntry {
    /// Assign an identifier and timestamp, producing the stored form
    pub fn into_saved(self, id: String) -> SavedEntry {
        SavedEntry {
            id,
            title: self.title,
            link: self.link,
            image_url: self.image_url,
            media_type: self.media_type,
            saved_at: Utc::now(),
        }
    }
}

/// Group entries by media type, preserving insertion order within each group
pub fn group_by_media_type(entries: Vec<SavedEntry>) -> BTreeMap<MediaType, Vec<SavedEntry>> {
    let mut groups: BTreeMap<MediaType, Vec<SavedEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.media_type).or_default().push(entry);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, media_type: MediaType) -> SavedEntry {
        NewEntry {
            title: format!("title {}", id),
            link: format!("https://example.com/{}", id),
            image_url: String::new(),
            media_type,
        }
        .into_saved(id.to_string())
    }

    #[test]
    fn test_media_type_parse() {
        assert_eq!("movie".parse::<MediaType>().unwrap(), MediaType::Movie);
        assert_eq!(" Book ".parse::<MediaType>().unwrap(), MediaType::Book);
        assert_eq!("ALBUM".parse::<MediaType>().unwrap(), MediaType::Album);
        assert!(matches!(
            "podcast".parse::<MediaType>(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_media_type_serializes_lowercase() {
        let json = serde_json::to_string(&MediaType::Album).unwrap();
        assert_eq!(json, "\"album\"");
    }

    #[test]
    fn test_group_by_media_type_keeps_order() {
        let groups = group_by_media_type(vec![
            entry("1", MediaType::Book),
            entry("2", MediaType::Movie),
            entry("3", MediaType::Book),
        ]);

        assert_eq!(groups.len(), 2);
        let books: Vec<&str> = groups[&MediaType::Book].iter().map(|e| e.id.as_str()).collect();
        assert_eq!(books, vec!["1", "3"]);
        assert_eq!(groups[&MediaType::Movie].len(), 1);
        assert!(!groups.contains_key(&MediaType::Album));
    }

    #[test]
    fn test_saved_entry_missing_image_defaults_empty() {
        let json = r#"{"id":"a","title":"t","link":"l","media_type":"movie","saved_at":"2024-01-01T00:00:00Z"}"#;
        let entry: SavedEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.image_url, "");
        assert_eq!(entry.media_type, MediaType::Movie);
    }
}
