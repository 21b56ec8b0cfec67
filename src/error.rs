//! Error types for the card studio

use thiserror::Error;

/// Result type alias for studio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failures while resolving a repository reference to metadata.
///
/// `NotFound`, `RateLimited` and `Transient` all leave the session on the
/// input screen; the caller surfaces them and the user may resubmit. The
/// fetcher never retries on its own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The raw input does not reduce to an `owner/name` pair
    #[error("reference does not name an owner/repository pair")]
    MalformedReference,

    /// The remote answered 404
    #[error("repository not found")]
    NotFound,

    /// The remote rejected the request with a rate-limit status
    #[error("rate limited by the metadata service")]
    RateLimited,

    /// Network failure or an unexpected response shape
    #[error("lookup failed: {0}")]
    Transient(String),
}

/// Failures while capturing a card surface into a bitmap.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// The surface carries no paint commands
    #[error("surface has no content to capture")]
    EmptySurface,

    /// The avatar image could not be fetched
    #[error("avatar fetch failed: {0}")]
    AvatarFetch(String),

    /// The avatar bytes could not be decoded as an image
    #[error("avatar decode failed: {0}")]
    AvatarDecode(String),

    /// PNG encoding of the finished pixels failed
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Errors that can occur in the studio facade or the CLI
#[derive(Error, Debug)]
pub enum Error {
    /// Metadata lookup failed
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Bitmap capture failed
    #[error(transparent)]
    Raster(#[from] RasterError),

    /// The studio worker thread has shut down or dropped a reply
    #[error("studio unavailable: {0}")]
    StudioClosed(String),

    /// A command was issued in a state that cannot serve it
    #[error("invalid operation: {0}")]
    InvalidState(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Writing the exported artifact to disk failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
