use crate::error::{ErrorKind, Result};
use crate::{Database, Repository};
use dlorg_extract::models::{WorkId, WorkMetadata};
use dlorg_fetch::Fetcher;
use exn::OptionExt;
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Memoizes a [`Fetcher`] in a persistent store.
///
/// Construction is inert: nothing touches the filesystem until
/// [`open`](Self::open). Every [`get`](Self::get) between `open` and
/// [`close`](Self::close) consults the store first and only falls through to
/// the wrapped fetcher on a miss. Failed fetches are never stored.
#[derive(Debug)]
pub struct CachedFetcher<F> {
    path: PathBuf,
    fetcher: F,
    state: Option<(Database, Repository)>,
}

impl<F: Fetcher> CachedFetcher<F> {
    pub fn new(path: impl Into<PathBuf>, fetcher: F) -> Self {
        Self {
            path: path.into(),
            fetcher,
            state: None,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    /// Open (creating if necessary) the backing store. Opening an already
    /// open cache is a no-op.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn open(&mut self) -> Result<()> {
        if self.state.is_none() {
            let db = Database::connect(&self.path).await?;
            let repo = Repository::from(&db);
            self.state = Some((db, repo));
        }
        Ok(())
    }

    /// Release the backing store. Subsequent lookups fail until reopened.
    pub async fn close(&mut self) {
        if let Some((db, _)) = self.state.take() {
            db.close().await;
        }
    }

    fn repository(&self) -> Result<&Repository> {
        Ok(&self.state.as_ref().ok_or_raise(|| ErrorKind::Unopened)?.1)
    }

    /// Return metadata for `id`, fetching and storing it on a cache miss.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: &WorkId) -> Result<WorkMetadata> {
        let repo = self.repository()?;
        if let Some(metadata) = repo.get(id).await? {
            debug!("cache hit");
            return Ok(metadata);
        }
        debug!("cache miss");
        let metadata = self.fetcher.fetch(id).await.map_err(ErrorKind::fetch)?;
        repo.insert(&metadata).await?;
        Ok(metadata)
    }

    /// Fetch `id` again, replacing whatever is stored for it.
    ///
    /// The stored entry is only dropped once the new fetch has succeeded, so
    /// a failure leaves the cache exactly as it was.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn refresh(&self, id: &WorkId) -> Result<WorkMetadata> {
        let repo = self.repository()?;
        let metadata = self.fetcher.fetch(id).await.map_err(ErrorKind::fetch)?;
        self.forget(id).await?;
        repo.insert(&metadata).await?;
        Ok(metadata)
    }

    /// Drop any stored metadata for `id` so the next lookup refetches it.
    pub async fn forget(&self, id: &WorkId) -> Result<bool> {
        let removed = self.repository()?.delete(id).await?;
        if removed {
            debug!(%id, "forgot cached metadata");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dlorg_fetch::error::{ErrorKind as FetchErrorKind, Result as FetchResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and answers from a fixed table.
    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
        known: Vec<WorkMetadata>,
    }
    impl CountingFetcher {
        fn with(known: Vec<WorkMetadata>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                known,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }
    #[async_trait]
    impl Fetcher for CountingFetcher {
        async fn fetch(&self, id: &WorkId) -> FetchResult<WorkMetadata> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.known.iter().find(|work| &work.id == id) {
                Some(work) => Ok(work.clone()),
                None => exn::bail!(FetchErrorKind::NotFound(id.clone())),
            }
        }
    }

    fn work(id: &str) -> WorkMetadata {
        WorkMetadata {
            id: id.parse().unwrap(),
            name: "Foo".to_string(),
            maker: "Bar".to_string(),
            series: None,
        }
    }

    fn id(s: &str) -> WorkId {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut cache = CachedFetcher::new(temp_dir.path().join("works.sqlite3"), CountingFetcher::with(vec![work("RJ123456")]));
        cache.open().await.unwrap();
        let first = cache.get(&id("RJ123456")).await.unwrap();
        let second = cache.get(&id("RJ123456")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.fetcher().calls(), 1);
        cache.close().await;
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut cache = CachedFetcher::new(temp_dir.path().join("works.sqlite3"), CountingFetcher::default());
        cache.open().await.unwrap();
        for _ in 0..2 {
            let err = cache.get(&id("RJ999999")).await.unwrap_err();
            assert!(matches!(&*err, ErrorKind::Fetch(FetchErrorKind::NotFound(missing)) if missing.as_str() == "RJ999999"));
            assert!(err.is_item_failure());
        }
        assert_eq!(cache.fetcher().calls(), 2);
        cache.close().await;
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("works.sqlite3");
        let mut cache = CachedFetcher::new(&path, CountingFetcher::with(vec![work("RJ123456")]));
        cache.open().await.unwrap();
        cache.get(&id("RJ123456")).await.unwrap();
        cache.close().await;

        // A fresh fetcher that knows nothing proves the value comes from disk.
        let mut cache = CachedFetcher::new(&path, CountingFetcher::default());
        cache.open().await.unwrap();
        assert_eq!(cache.get(&id("RJ123456")).await.unwrap(), work("RJ123456"));
        assert_eq!(cache.fetcher().calls(), 0);
        cache.close().await;
    }

    #[tokio::test]
    async fn test_unopened() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut cache = CachedFetcher::new(temp_dir.path().join("works.sqlite3"), CountingFetcher::with(vec![work("RJ123456")]));
        assert!(!cache.is_open());
        let err = cache.get(&id("RJ123456")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Unopened));

        cache.open().await.unwrap();
        assert!(cache.is_open());
        cache.close().await;
        let err = cache.get(&id("RJ123456")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Unopened));
        assert!(!err.is_item_failure());
        assert_eq!(cache.fetcher().calls(), 0);
    }

    #[tokio::test]
    async fn test_open_creates_missing_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("a/b/works.sqlite3");
        let mut cache = CachedFetcher::new(&path, CountingFetcher::default());
        assert!(!path.exists(), "construction must not touch the filesystem");
        cache.open().await.unwrap();
        cache.close().await;
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_forget_forces_refetch() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut cache = CachedFetcher::new(temp_dir.path().join("works.sqlite3"), CountingFetcher::with(vec![work("RJ123456")]));
        cache.open().await.unwrap();
        cache.get(&id("RJ123456")).await.unwrap();
        assert!(cache.forget(&id("RJ123456")).await.unwrap());
        assert!(!cache.forget(&id("RJ123456")).await.unwrap());
        cache.get(&id("RJ123456")).await.unwrap();
        assert_eq!(cache.fetcher().calls(), 2);
        cache.close().await;
    }

    #[tokio::test]
    async fn test_refresh_replaces_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("works.sqlite3");
        let mut cache = CachedFetcher::new(&path, CountingFetcher::with(vec![work("RJ123456")]));
        cache.open().await.unwrap();
        cache.get(&id("RJ123456")).await.unwrap();
        cache.close().await;

        let renamed = WorkMetadata {
            name: "Renamed".to_string(),
            ..work("RJ123456")
        };
        let mut cache = CachedFetcher::new(&path, CountingFetcher::with(vec![renamed.clone()]));
        cache.open().await.unwrap();
        assert_eq!(cache.refresh(&id("RJ123456")).await.unwrap(), renamed);
        assert_eq!(cache.get(&id("RJ123456")).await.unwrap(), renamed);
        assert_eq!(cache.fetcher().calls(), 1);
        cache.close().await;
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("works.sqlite3");
        let mut cache = CachedFetcher::new(&path, CountingFetcher::with(vec![work("RJ123456")]));
        cache.open().await.unwrap();
        cache.get(&id("RJ123456")).await.unwrap();
        cache.close().await;

        // The storefront no longer knows the work.
        let mut cache = CachedFetcher::new(&path, CountingFetcher::default());
        cache.open().await.unwrap();
        let err = cache.refresh(&id("RJ123456")).await.unwrap_err();
        assert!(err.is_item_failure());
        assert_eq!(cache.get(&id("RJ123456")).await.unwrap(), work("RJ123456"));
        assert_eq!(cache.fetcher().calls(), 1);
        cache.close().await;
    }
}
