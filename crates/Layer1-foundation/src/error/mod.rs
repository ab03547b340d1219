//! Error types for uncommit
//!
//! Shared by the config loader and the JSON store.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Foundation error type
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Storage
    // ========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    // ========================================================================
    // External conversions
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Storage error helper
    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage(message.into())
    }
}
