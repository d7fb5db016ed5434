//! Error types for nlm-export.
//!
//! Lookup misses are not errors: locators and strategies return `None` and the
//! caller moves on. Only the variants below ever cross the public API.

/// Error type for export operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Nothing with readable text was found on the page.
    ///
    /// This is the only failure surfaced to the user, as a transient notice.
    #[error("Couldn't find chat/notes here. Scroll or select text and try again.")]
    InsufficientContent,

    /// The host clipboard could not be read (permission denied, empty, no browser).
    #[error("Clipboard read failed: {0}")]
    Clipboard(String),

    /// A simulated interaction with the host page failed.
    #[error("Host interaction failed: {0}")]
    Host(String),

    /// A cross-context message could not be decoded or encoded.
    #[error("Invalid message: {0}")]
    InvalidMessage(#[from] serde_json::Error),

    /// A URL for the print surface could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// No hand-off payload is stored under the requested key.
    #[error("No export payload stored under key {0}")]
    PayloadNotFound(String),
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, Error>;
