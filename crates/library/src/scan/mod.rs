//! Discovering work folders in a storage backend.

mod stream;

pub use self::stream::scan;
use dlorg_extract::models::WorkId;
use std::path::PathBuf;

/// How far below the root [`scan`] looks for work folders.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Only the immediate children of the root.
    #[default]
    TopLevel,
    /// Every directory that isn't itself inside a work folder.
    Recursive,
}

/// A directory whose name contains a catalog code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkFolder {
    /// Relative to the storage root.
    pub path: PathBuf,
    pub id: WorkId,
}
