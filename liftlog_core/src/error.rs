//! Error types for the liftlog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for liftlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Record store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Row lookup found nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input failed a domain validation check
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Operation requires a signed-in user
    #[error("Sign in required")]
    AuthRequired,

    /// Operation is deliberately not implemented yet
    #[error("Not yet supported: {0}")]
    Unsupported(&'static str),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
