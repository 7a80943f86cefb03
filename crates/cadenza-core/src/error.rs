//! Error types for the cadenza crates.

use thiserror::Error;

/// A shared error type for the whole workspace.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Resolver-facing variants
/// (`NoResults`, `Resolution`, `Download`, `InvalidSelection`) are caught at
/// the engine boundary and rendered as localized user messages; the rest
/// surface through logs.
#[derive(Error, Debug, Clone)]
pub enum CadenzaError {
    /// A search completed but matched nothing.
    #[error("no results")]
    NoResults,

    /// The resolver could not turn a query into candidates.
    #[error("resolution failed: {0}")]
    Resolution(String),

    /// The resolver could not produce a downloaded file.
    #[error("download failed: {0}")]
    Download(String),

    /// A selection referenced a stale or out-of-range search result.
    #[error("invalid selection")]
    InvalidSelection,

    /// Chat transport failure (send, upload, poll).
    #[error("transport error: {0}")]
    Transport(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("internal error: {0}")]
    Internal(String),
}

impl CadenzaError {
    /// Creates a Resolution error
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution(message.into())
    }

    /// Creates a Download error
    pub fn download(message: impl Into<String>) -> Self {
        Self::Download(message.into())
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NoResults error
    pub fn is_no_results(&self) -> bool {
        matches!(self, Self::NoResults)
    }
}

impl From<std::io::Error> for CadenzaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CadenzaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

/// A type alias for `Result<T, CadenzaError>`.
pub type Result<T> = std::result::Result<T, CadenzaError>;
