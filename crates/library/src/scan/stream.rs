use crate::error::{ErrorKind, Result};
use crate::scan::{Depth, WorkFolder};
use async_stream::stream;
use dlorg_extract::models::WorkId;
use dlorg_storage::{Entry, StorageBackend};
use exn::ResultExt;
use futures::Stream;
use std::path::PathBuf;
use tracing::debug;

/// Lazily yields every [`WorkFolder`] below the root of `backend`.
///
/// Directories are visited depth-first and each directory's children are
/// sorted by name, so the order is stable between runs. A directory whose
/// name contains a [`WorkId`] is yielded and never descended into; files and
/// anything that isn't a plain directory are ignored.
///
/// A directory that can't be listed yields an error and is skipped; the walk
/// carries on with its siblings, except for the root where there is nothing
/// left to walk.
pub fn scan(backend: &dyn StorageBackend, depth: Depth) -> impl Stream<Item = Result<WorkFolder>> + '_ {
    stream! {
        let mut stack: Vec<Option<PathBuf>> = vec![None];
        while let Some(dir) = stack.pop() {
            let mut entries: Vec<Entry> = match backend.list(dir.as_deref()).await.or_raise(|| ErrorKind::Discovery) {
                Ok(entries) => entries,
                Err(e) => {
                    yield Err(e);
                    continue;
                },
            };
            entries.retain(Entry::is_dir);
            entries.sort_by(|a, b| a.path.cmp(&b.path));

            let mut descend = Vec::new();
            for entry in entries {
                let found = entry.path.file_name().and_then(|name| WorkId::find_in(&name.to_string_lossy()));
                match found {
                    Some(id) => {
                        debug!(path = %entry.path.display(), %id, "discovered work folder");
                        yield Ok(WorkFolder { path: entry.path, id });
                    },
                    None if depth == Depth::Recursive => descend.push(Some(entry.path)),
                    None => {},
                }
            }
            // Reversed, so the alphabetically-first directory is popped next.
            stack.extend(descend.into_iter().rev());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlorg_storage::backend::MockBackend;
    use futures::TryStreamExt;

    fn folders(list: &[(&str, &str)]) -> Vec<WorkFolder> {
        list.iter().map(|(path, id)| WorkFolder { path: PathBuf::from(path), id: id.parse().unwrap() }).collect()
    }

    fn backend() -> MockBackend {
        MockBackend::with_dirs([
            "RJ222222",
            "[Circle] RJ111111 Title",
            "unrelated/RJ333333",
            "unrelated/deeper/VJ01234567 game",
            "RJ444444/RJ555555",
            "no code here",
        ])
        .with_files(["RJ666666.zip", "unrelated/RJ777777.txt"])
    }

    #[tokio::test]
    async fn test_top_level_only() {
        let backend = backend();
        let found: Vec<_> = scan(&backend, Depth::TopLevel).try_collect().await.unwrap();
        assert_eq!(
            found,
            folders(&[("RJ222222", "RJ222222"), ("RJ444444", "RJ444444"), ("[Circle] RJ111111 Title", "RJ111111")])
        );
    }

    #[tokio::test]
    async fn test_recursive() {
        let backend = backend();
        let found: Vec<_> = scan(&backend, Depth::Recursive).try_collect().await.unwrap();
        assert_eq!(
            found,
            folders(&[
                ("RJ222222", "RJ222222"),
                ("RJ444444", "RJ444444"),
                ("[Circle] RJ111111 Title", "RJ111111"),
                ("unrelated/RJ333333", "RJ333333"),
                ("unrelated/deeper/VJ01234567 game", "VJ01234567"),
            ])
        );
    }

    #[tokio::test]
    async fn test_does_not_descend_into_work_folders() {
        let backend = MockBackend::with_dirs(["RJ444444/RJ555555/RJ666666"]);
        let found: Vec<_> = scan(&backend, Depth::Recursive).try_collect().await.unwrap();
        assert_eq!(found, folders(&[("RJ444444", "RJ444444")]));
    }

    #[tokio::test]
    async fn test_empty_root() {
        let backend = MockBackend::default();
        let found: Vec<_> = scan(&backend, Depth::Recursive).try_collect().await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_is_lazy() {
        use futures::StreamExt;
        let backend = backend();
        let mut stream = std::pin::pin!(scan(&backend, Depth::Recursive));
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.path, PathBuf::from("RJ222222"));
    }

    #[tokio::test]
    async fn test_local_listing_error_is_reported() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = dlorg_storage::backend::LocalBackend::new("local", temp_dir.path()).unwrap();
        std::fs::create_dir(temp_dir.path().join("RJ123456")).unwrap();
        let found: Vec<_> = scan(&backend, Depth::TopLevel).try_collect().await.unwrap();
        assert_eq!(found, folders(&[("RJ123456", "RJ123456")]));
        // Removing the root out from under the backend makes listing fail.
        drop(temp_dir);
        let err = scan(&backend, Depth::TopLevel).try_collect::<Vec<_>>().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Discovery));
    }
}
