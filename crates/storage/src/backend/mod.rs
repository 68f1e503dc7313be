//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, the handful of directory
//! operations needed to find work folders and move them around. Everything
//! above this layer (discovery, planning, executing) only ever talks to a
//! backend, so tests can swap the real filesystem for [`MockBackend`].

mod local;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::local::LocalBackend;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockBackend;
use crate::Entry;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Unified interface for storage backends.
///
/// # Path Handling
/// All paths are relative to the storage root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations should
/// enforce this validation. Because an empty path never validates, the root
/// itself can be listed (by passing `None`) but never renamed or removed.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use dlorg_storage::{backend::StorageBackend, error::Result};
///
/// async fn count_top_level_dirs(backend: &dyn StorageBackend) -> Result<usize> {
///     Ok(backend.list(None).await?.iter().filter(|entry| entry.is_dir()).count())
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend (used for logging only).
    fn name(&self) -> &str;

    /// List the immediate children of a directory (`None` for the root).
    ///
    /// No ordering is guaranteed; callers that need determinism must sort.
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the
    /// directory does not exist, or
    /// [`NotADirectory`](crate::error::ErrorKind::NotADirectory) if it isn't
    /// one.
    async fn list(&self, dir: Option<&Path>) -> Result<Vec<Entry>>;

    /// Check if anything (file or directory) exists at the path.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Move a file or directory (with everything inside it).
    ///
    /// # Notes
    /// - Implementations must create parent directories of `to` as needed.
    /// - Never overwrites: returns
    ///   [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) if `to`
    ///   exists, and [`NotFound`](crate::error::ErrorKind::NotFound) if
    ///   `from` doesn't.
    /// - Moving a directory inside itself is
    ///   [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// # use dlorg_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// backend.rename(
    ///     Path::new("RJ123456"),
    ///     Path::new("Series/RJ123456 [Maker] Name")
    /// ).await?;
    /// # Ok(())
    /// # }
    /// ```
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Remove a directory, but only if it has no children.
    ///
    /// Returns `Ok(true)` if the directory was removed and `Ok(false)` if it
    /// still has contents.
    async fn remove_dir_if_empty(&self, path: &Path) -> Result<bool>;
}
