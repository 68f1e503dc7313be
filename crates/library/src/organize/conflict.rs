use crate::organize::error::{ErrorKind, Result};
use dlorg_storage::StorageBackend;
use exn::ResultExt;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// How many destinations (the original plus ` (2)` up to ` (n)`) are tried
/// before a work is reported as [`Conflict`](ErrorKind::Conflict).
pub const MAX_DISAMBIGUATION: usize = 100;

/// The `n`th candidate for `destination`: itself for `n <= 1`, otherwise the
/// same path with ` (n)` appended to the final component.
pub(crate) fn variant(destination: &Path, n: usize) -> PathBuf {
    if n <= 1 {
        return destination.to_path_buf();
    }
    let mut name = destination.file_name().unwrap_or_default().to_os_string();
    name.push(format!(" ({n})"));
    destination.with_file_name(name)
}

/// Whether `path` is one of the ` (n)` variants of `destination` that
/// [`variant`] could have produced.
pub(crate) fn is_variant_of(path: &Path, destination: &Path) -> bool {
    if path.parent() != destination.parent() {
        return false;
    }
    let (Some(name), Some(base)) =
        (path.file_name().and_then(|n| n.to_str()), destination.file_name().and_then(|n| n.to_str()))
    else {
        return false;
    };
    name.strip_prefix(base)
        .and_then(|rest| rest.strip_prefix(" ("))
        .and_then(|rest| rest.strip_suffix(')'))
        .filter(|digits| !digits.starts_with('0') && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<usize>().ok())
        .is_some_and(|n| (2..=MAX_DISAMBIGUATION).contains(&n))
}

/// Paths that will be occupied once the plan has been executed.
#[derive(Debug, Default)]
pub(crate) struct Claims {
    taken: BTreeSet<PathBuf>,
}
impl Claims {
    pub(crate) fn claim(&mut self, path: impl Into<PathBuf>) {
        self.taken.insert(path.into());
    }

    /// A path is available if it neither is, contains, nor sits inside a
    /// claimed path.
    pub(crate) fn is_available(&self, path: &Path) -> bool {
        !self.taken.iter().any(|taken| taken.starts_with(path) || path.starts_with(taken))
    }

    /// First candidate for `destination` that is unclaimed and doesn't exist
    /// on disk. Only reads from `backend`.
    pub(crate) async fn first_free(
        &self,
        backend: &dyn StorageBackend,
        destination: &Path,
    ) -> Result<Option<PathBuf>> {
        for n in 1..=MAX_DISAMBIGUATION {
            let candidate = variant(destination, n);
            if !self.is_available(&candidate) {
                continue;
            }
            if backend.exists(&candidate).await.or_raise(|| ErrorKind::Storage)? {
                continue;
            }
            return Ok(Some(candidate));
        }
        Ok(None)
    }
}
