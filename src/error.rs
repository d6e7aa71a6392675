//! Custom error types for rustmultischolar.
//!
//! Only the I/O edges (HTTP fetches, response decoding, catalog files) can fail.
//! The normalization and merge core degrades malformed input to defaults instead
//! of returning errors.

use thiserror::Error;

/// Main error type for rustmultischolar operations.
#[derive(Debug, Error)]
pub enum ScholarError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response or catalog parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Malformed XML in an Atom feed
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Rate limited or blocked by an external API
    #[error("Rate limited by {0}")]
    RateLimited(String),

    /// External API returned an error status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message
        message: String,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias using `ScholarError`
pub type Result<T> = std::result::Result<T, ScholarError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| ScholarError::Parse(msg.to_string()))
    }
}
