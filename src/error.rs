//! Error types
//!
//! Unmatched selectors are not errors: they surface as `null` or `[]` in the
//! output object. Everything here aborts the whole operation.

use thiserror::Error;

/// Error type returned by user-supplied computed fields
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The document could not be fetched (connection, TLS, body decoding)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// A computed field's function returned an error
    #[error("computed field `{key}` failed: {source}")]
    Computed {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Problems building a [`Schema`](crate::Schema) from JSON
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),
}
