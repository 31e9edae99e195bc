//! Custom error types for scholar-harvest.
//!
//! Fatal failures (intake, discovery, database, log writing) surface as
//! `HarvestError`. Per-item failures during extraction and download are kept
//! as values instead and never reach this type's callers.

use thiserror::Error;

/// Main error type for scholar-harvest operations.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Headless browser launch, navigation or rendering error
    #[error("Browser error: {0}")]
    Browser(String),

    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTML or URL parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Operator supplied something unusable at a prompt
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A single artifact could not be saved
    #[error("Download error: {0}")]
    Download(String),
}

/// Result type alias using `HarvestError`
pub type Result<T> = std::result::Result<T, HarvestError>;

