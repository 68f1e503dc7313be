use crate::organize::error::{Error, ErrorKind};
use crate::organize::{Plan, Rename};
use dlorg_storage::StorageBackend;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// A planned rename that could not be applied.
#[derive(Debug)]
pub struct ExecutionFailure {
    pub rename: Rename,
    pub error: Error,
}

/// What [`execute`] actually did.
#[derive(Debug, Default)]
pub struct Report {
    pub renamed: Vec<Rename>,
    pub failed: Vec<ExecutionFailure>,
    /// Directories removed because the moves left them empty, in removal order.
    pub removed_dirs: Vec<PathBuf>,
}
impl Report {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Applies every rename in `plan`, in order.
///
/// A rename that fails (most likely because something appeared at its
/// destination since planning; nothing is ever overwritten) is recorded in
/// [`Report::failed`] with [`ErrorKind::Storage`] and the rest carry on.
///
/// Afterwards, starting from the former parent of each moved folder, empty
/// directories are removed walking up towards the root. The walk stops at the
/// first directory that still has contents, and never removes the root.
#[instrument(skip_all, fields(renames = plan.renames.len(), backend = backend.name()))]
pub async fn execute(plan: &Plan, backend: &dyn StorageBackend) -> Report {
    let mut report = Report::default();
    for rename in &plan.renames {
        match backend.rename(&rename.source, &rename.destination).await.or_raise(|| ErrorKind::Storage) {
            Ok(()) => {
                info!(from = %rename.source.display(), to = %rename.destination.display(), "renamed");
                report.renamed.push(rename.clone());
            },
            Err(error) => {
                warn!(from = %rename.source.display(), to = %rename.destination.display(), %error, "rename failed");
                report.failed.push(ExecutionFailure {
                    rename: rename.clone(),
                    error,
                });
            },
        }
    }
    report.removed_dirs = remove_empty_parents(&report.renamed, backend).await;
    report
}

async fn remove_empty_parents(renamed: &[Rename], backend: &dyn StorageBackend) -> Vec<PathBuf> {
    let mut starts: Vec<&Path> = renamed
        .iter()
        .filter_map(|rename| rename.source.parent())
        .filter(|parent| !parent.as_os_str().is_empty())
        .collect();
    // Deepest first, so a shared ancestor is looked at again after each of
    // its emptied children is gone.
    starts.sort_by(|a, b| b.components().count().cmp(&a.components().count()).then_with(|| a.cmp(b)));
    starts.dedup();

    let mut removed: Vec<PathBuf> = Vec::new();
    for start in starts {
        for dir in start.ancestors().take_while(|dir| !dir.as_os_str().is_empty()) {
            if removed.iter().any(|gone| gone == dir) {
                continue;
            }
            match backend.remove_dir_if_empty(dir).await {
                Ok(true) => {
                    info!(path = %dir.display(), "removed empty directory");
                    removed.push(dir.to_path_buf());
                },
                Ok(false) => break,
                Err(error) => {
                    warn!(path = %dir.display(), %error, "could not remove directory");
                    break;
                },
            }
        }
    }
    removed
}
