//! Fetch Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use dlorg_extract::error::{Error as ExtractError, ErrorKind as ExtractErrorKind};
use dlorg_extract::models::WorkId;

/// A fetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Neither the product page nor the announce page exists for this work.
    #[display("work not found: {_0}")]
    NotFound(#[error(not(source))] WorkId),
    /// Transport failure (connection, timeout, unexpected HTTP status).
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// The page was fetched but required metadata could not be extracted.
    #[display("extraction error: {_0}")]
    Extract(ExtractErrorKind),
    /// The HTTP client could not be constructed.
    #[display("invalid HTTP client configuration")]
    Client,
}
impl ErrorKind {
    /// Convert an extraction error into a fetch error, preserving the
    /// extract crate's `Exn` frame (error tree) as a child in its own
    /// error tree.
    #[track_caller]
    pub fn extract(err: ExtractError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Extract(inner))
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
