//! Local filesystem storage backend.
//!
//! This module provides a storage backend implementation for the local filesystem.
//! Paths are resolved against a configured root directory and accessed via
//! `tokio::fs` for async I/O.

use crate::error::ErrorKind;
use crate::{Entry, EntryKind, StorageBackend, error::Result, path::validate as validate_path};
use async_trait::async_trait;
use std::fs::FileType;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Local filesystem storage backend.
///
/// All paths are relative to the configured root directory.
///
/// # Examples
///
/// ```no_run
/// use dlorg_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("local", "/path/to/downloads")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalBackend {
    name: String,
    /// Root directory being organized
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) if the path is not
    /// absolute, [`NotFound`](ErrorKind::NotFound) if it doesn't exist and
    /// [`NotADirectory`](ErrorKind::NotADirectory) if it isn't a directory.
    /// The root is never created: organizing a directory that isn't there is
    /// a mistake.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        // Use non-async here; it'll only happen once on startup and it's not
        // worth the hassle of making the constructor async.
        let metadata = std::fs::metadata(&root).map_err(|e| Self::map_io_error(e, &root))?;
        if !metadata.is_dir() {
            exn::bail!(ErrorKind::NotADirectory(root));
        }
        Ok(Self { name: name.into(), root })
    }

    /// Get the absolute path for a relative storage path.
    ///
    /// Validates the path and joins it with the root directory.
    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists(path.to_path_buf()),
            std::io::ErrorKind::NotADirectory => ErrorKind::NotADirectory(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    fn kind(file_type: FileType) -> EntryKind {
        // `DirEntry::file_type` doesn't follow symlinks, so a link to a
        // directory is `Other` and never moved or descended into.
        if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self, dir: Option<&Path>) -> Result<Vec<Entry>> {
        let (relative, absolute) = match dir {
            Some(dir) => {
                let relative = validate_path(dir)?;
                let absolute = self.root.join(&relative);
                (relative, absolute)
            },
            None => (PathBuf::new(), self.root.clone()),
        };
        let mut entries = fs::read_dir(&absolute).await.map_err(|e| Self::map_io_error(e, &relative))?;
        let mut listing = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| Self::map_io_error(e, &relative))? {
            let file_type = entry.file_type().await.map_err(|e| Self::map_io_error(e, &relative))?;
            listing.push(Entry::new(relative.join(entry.file_name()), Self::kind(file_type)));
        }
        Ok(listing)
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::try_exists(&abs_path).await.map_err(ErrorKind::Io)?)
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let from = validate_path(from)?;
        let to = validate_path(to)?;
        if to.starts_with(&from) {
            exn::bail!(ErrorKind::InvalidPath(to));
        }
        let from_path = self.root.join(&from);
        let to_path = self.root.join(&to);
        fs::symlink_metadata(&from_path).await.map_err(|e| Self::map_io_error(e, &from))?;
        // `rename(2)` happily replaces an empty directory, so check first.
        if fs::try_exists(&to_path).await.map_err(ErrorKind::Io)? {
            exn::bail!(ErrorKind::AlreadyExists(to));
        }
        // Create parent directories for destination if needed
        if let Some(parent) = to_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, &to))?;
        }
        fs::rename(&from_path, &to_path).await.map_err(|e| Self::map_io_error(e, &to))?;
        debug!(backend = %self.name, from = %from.display(), to = %to.display(), "renamed");
        Ok(())
    }

    async fn remove_dir_if_empty(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        let mut entries = fs::read_dir(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?;
        if entries.next_entry().await.map_err(|e| Self::map_io_error(e, path))?.is_some() {
            return Ok(false);
        }
        fs::remove_dir(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?;
        Ok(true)
    }
}
