//! # WRL Common Library
//!
//! Shared code for the watch/read/listen service:
//! - Error type used across crates
//! - Configuration loading (TOML file, environment, compiled defaults)
//! - Saved entry model and media type tag
//! - Entry persistence (JSON file or SQLite table)
//! - Utility functions

pub mod config;
pub mod entry;
pub mod error;
pub mod store;
pub mod uuid_utils;

pub use entry::{MediaType, NewEntry, SavedEntry};
pub use error::{Error, Result};
pub use store::EntryStore;
