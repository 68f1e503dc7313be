//! In-memory storage backend for testing.

use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_path;
use crate::{Entry, EntryKind, StorageBackend};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// The tree is a sorted map of path to [`EntryKind`] behind a [`RwLock`], so
/// all trait methods can operate on `&self` without external synchronisation.
/// Every ancestor of an inserted path is implicitly a directory.
///
/// # Examples
///
/// ```
/// use dlorg_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_dirs(["downloads/RJ123456"]).with_files(["downloads/RJ123456/readme.txt"]);
/// assert!(backend.exists(Path::new("downloads")).await?);
///
/// backend.rename(Path::new("downloads/RJ123456"), Path::new("RJ123456 [Bar] Foo")).await?;
/// assert!(backend.exists(Path::new("RJ123456 [Bar] Foo/readme.txt")).await?);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    tree: RwLock<BTreeMap<PathBuf, EntryKind>>,
    failing_renames: HashSet<PathBuf>,
    failing_exists: HashSet<PathBuf>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with (possibly nested) directories.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_dirs(dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        let mut tree = BTreeMap::new();
        for dir in dirs {
            insert(&mut tree, validated(dir.into()), EntryKind::Directory);
        }
        Self {
            name: "mock".to_string(),
            tree: RwLock::new(tree),
            failing_renames: HashSet::new(),
            failing_exists: HashSet::new(),
        }
    }

    /// Add files (and their parent directories).
    pub fn with_files(self, files: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        let mut tree = self.tree.into_inner();
        for file in files {
            insert(&mut tree, validated(file.into()), EntryKind::File);
        }
        Self {
            tree: RwLock::new(tree),
            ..self
        }
    }

    /// Make every rename *from* this path fail with
    /// [`PermissionDenied`](ErrorKind::PermissionDenied).
    pub fn with_failing_rename(mut self, from: impl Into<PathBuf>) -> Self {
        self.failing_renames.insert(validated(from.into()));
        self
    }

    /// Make asking whether this path exists fail with
    /// [`BackendError`](ErrorKind::BackendError).
    pub fn with_failing_exists(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing_exists.insert(validated(path.into()));
        self
    }

    /// Change the name of the mock backend.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Snapshot of every path currently in the tree, in sorted order.
    pub async fn paths(&self) -> Vec<PathBuf> {
        self.tree.read().await.keys().cloned().collect()
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        Self::with_dirs(Vec::<PathBuf>::new())
    }
}

fn validated(path: PathBuf) -> PathBuf {
    let Ok(validated) = validate_path(&path) else {
        // The panic here is DELIBERATE. MockBackend is intended to be
        // used in tests; panics are expected. There is no error result.
        panic!("MockBackend: invalid path {}", path.display());
    };
    validated
}

fn insert(tree: &mut BTreeMap<PathBuf, EntryKind>, path: PathBuf, kind: EntryKind) {
    for ancestor in path.ancestors().skip(1).filter(|a| !a.as_os_str().is_empty()) {
        tree.insert(ancestor.to_path_buf(), EntryKind::Directory);
    }
    tree.insert(path, kind);
}

fn parent_of(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new(""))
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self, dir: Option<&Path>) -> Result<Vec<Entry>> {
        let dir = dir.map(validate_path).transpose()?.unwrap_or_default();
        let guard = self.tree.read().await;
        if !dir.as_os_str().is_empty() {
            match guard.get(&dir) {
                Some(EntryKind::Directory) => {},
                Some(_) => exn::bail!(ErrorKind::NotADirectory(dir)),
                None => exn::bail!(ErrorKind::NotFound(dir)),
            }
        }
        Ok(guard
            .iter()
            .filter(|(path, _)| parent_of(path) == dir)
            .map(|(path, kind)| Entry::new(path.clone(), *kind))
            .collect())
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        if self.failing_exists.contains(&path) {
            exn::bail!(ErrorKind::BackendError(format!("cannot stat {}", path.display())));
        }
        Ok(self.tree.read().await.contains_key(&path))
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let from = validate_path(from)?;
        let to = validate_path(to)?;
        if self.failing_renames.contains(&from) {
            exn::bail!(ErrorKind::PermissionDenied(from));
        }
        if to.starts_with(&from) {
            exn::bail!(ErrorKind::InvalidPath(to));
        }
        let mut guard = self.tree.write().await;
        if !guard.contains_key(&from) {
            exn::bail!(ErrorKind::NotFound(from));
        }
        if guard.contains_key(&to) {
            exn::bail!(ErrorKind::AlreadyExists(to));
        }
        let blocked = |ancestor: &&Path| guard.get(*ancestor).is_some_and(|kind| *kind != EntryKind::Directory);
        if let Some(blocker) = to.ancestors().skip(1).find(blocked) {
            exn::bail!(ErrorKind::NotADirectory(blocker.to_path_buf()));
        }
        let moved: Vec<_> = guard.keys().filter(|path| path.starts_with(&from)).cloned().collect();
        let mut entries = Vec::with_capacity(moved.len());
        for path in moved {
            if let Some(kind) = guard.remove(&path) {
                let relative = path.strip_prefix(&from).unwrap_or(Path::new(""));
                entries.push((to.join(relative), kind));
            }
        }
        for (path, kind) in entries {
            insert(&mut guard, path, kind);
        }
        Ok(())
    }

    async fn remove_dir_if_empty(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        let mut guard = self.tree.write().await;
        match guard.get(&path) {
            Some(EntryKind::Directory) => {},
            Some(_) => exn::bail!(ErrorKind::NotADirectory(path)),
            None => exn::bail!(ErrorKind::NotFound(path)),
        }
        if guard.keys().any(|other| parent_of(other) == path) {
            return Ok(false);
        }
        guard.remove(&path);
        Ok(true)
    }
}
