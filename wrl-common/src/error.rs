//! Error type shared by the store, configuration and model code

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// SQLite backend failure
    #[cfg(feature = "sqlx")]
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    /// Entries file or config file could not be read or written
    #[error("file access: {0}")]
    Io(#[from] std::io::Error),

    /// Entries file could not be encoded or decoded
    #[error("entries file format: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(String),

    /// Rejected value supplied by a caller (media type tag, empty title, ...)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Stored data could not be interpreted
    #[error("corrupt stored entry: {0}")]
    Internal(String),
}
