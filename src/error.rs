//! Error types for Lese.

use thiserror::Error;

/// Library-level error type for Lese operations.
#[derive(Error, Debug)]
pub enum LeseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Login failed: no member with that name and ID")]
    AuthFailed,

    #[error("A member with the email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("A book with the title '{0}' already exists")]
    DuplicateTitle(String),

    #[error("No book titled '{0}' in the catalog")]
    BookNotFound(String),

    #[error("No copies of '{0}' are currently available")]
    NoCopiesAvailable(String),

    #[error("Member not found: {0}")]
    MemberNotFound(i64),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Assistant error: {0}")]
    Assistant(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

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
}

/// Result type alias for Lese operations.
pub type Result<T> = std::result::Result<T, LeseError>;
