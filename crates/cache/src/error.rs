//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use dlorg_fetch::error::{Error as FetchError, ErrorKind as FetchErrorKind};
use std::path::PathBuf;

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Everything except [`ErrorKind::Fetch`] is a problem with the store itself.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// The directory holding the database file could not be created.
    #[display("cannot create cache directory: {}", _0.display())]
    Directory(#[error(not(source))] PathBuf),
    /// Serialization/deserialization error.
    #[display("invalid cache data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
    /// The cache was used before being opened, or after being closed.
    #[display("called unopened cache")]
    Unopened,
    /// The wrapped fetcher failed on a cache miss. Nothing was stored.
    #[display("fetch error: {_0}")]
    Fetch(FetchErrorKind),
}
impl ErrorKind {
    /// Convert a fetch error into a cache error, preserving the fetch
    /// crate's `Exn` frame (error tree) as a child in its own error tree.
    #[track_caller]
    pub fn fetch(err: FetchError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Fetch(inner))
    }

    /// Returns `true` for failures that concern a single work rather than the
    /// store; callers processing many works can skip the item and continue.
    pub fn is_item_failure(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(kind) => kind.is_retryable(),
            _ => false,
        }
    }
}
