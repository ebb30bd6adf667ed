//! Error types for Tekst.

use thiserror::Error;

/// Library-level error type for Tekst operations.
#[derive(Error, Debug)]
pub enum TekstError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The watch page could not be loaded (DNS, connection, timeout, HTTP error status).
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The transcript panel could not be revealed or did not render.
    ///
    /// Covers both captions being disabled and the page layout having changed;
    /// the two cannot be told apart from the outside.
    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<chromiumoxide::error::CdpError> for TekstError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        TekstError::Browser(err.to_string())
    }
}

/// Result type alias for Tekst operations.
pub type Result<T> = std::result::Result<T, TekstError>;
