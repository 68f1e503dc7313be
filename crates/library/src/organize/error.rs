//! Error types for the [`organize`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};

/// An organize error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for organize operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of an organize failure.
///
/// Each variant identifies the subsystem that failed, allowing callers to
/// inspect the error tree without matching on opaque strings.
///
/// ### Per-work failures
/// Recorded against a single work (in [`Plan::failures`](super::Plan) or
/// [`Report::failed`](super::Report)); everything else carries on.
/// - [`ErrorKind::Fetch`]
/// - [`ErrorKind::Template`]
/// - [`ErrorKind::Conflict`]
/// - [`ErrorKind::Storage`]
///
/// ### Fatal
/// - [`ErrorKind::Cache`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Metadata for the work could not be fetched or parsed.
    #[display("could not resolve metadata")]
    Fetch,
    /// The [`PathGenerator`](crate::PathGenerator) could not render a path.
    #[display("could not generate destination path")]
    Template,
    /// No collision-free destination exists for the work.
    #[display("no free destination")]
    Conflict,
    /// The metadata cache itself failed, or was used while closed.
    #[display("metadata cache failure")]
    Cache,
    /// A storage backend operation (list, exists, rename) failed.
    #[display("storage failure")]
    Storage,
}

impl ErrorKind {
    /// Returns `true` for failures recorded against a single work; anything
    /// else aborts the plan.
    pub fn is_item_failure(&self) -> bool {
        !matches!(self, Self::Cache)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            _ => false,
        }
    }
}
