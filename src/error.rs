//! Error types for Podium.

use thiserror::Error;

/// Library-level error type for Podium operations.
#[derive(Error, Debug)]
pub enum PodiumError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Content store error: {0}")]
    Store(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Model response error: {0}")]
    Model(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Document not found")]
    DocumentNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Podium operations.
pub type Result<T> = std::result::Result<T, PodiumError>;
