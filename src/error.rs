//! Error types for docbridge library.

use std::io;
use thiserror::Error;

/// Result type alias for docbridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building or exchanging document models.
///
/// Recoverable structural anomalies (malformed front matter, tables without a
/// separator row, empty fences) are never reported here. They travel as
/// [`crate::model::Diagnostic`] values next to the model.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No parser is registered for the requested input format.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The input could not be decoded as text.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Error during rendering (JSON wire form, markup).
    #[error("Rendering error: {0}")]
    Render(String),

    /// A persisted registry snapshot could not be decoded.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// A resource could not be fetched or copied.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The assembled model violates its synchronization invariant.
    #[error("Model out of sync: {0}")]
    ModelSync(String),

    /// Resource not found in the registry.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Fetch(err.to_string())
    }
}
