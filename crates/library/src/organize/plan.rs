use crate::organize::conflict::{Claims, is_variant_of};
use crate::organize::error::{Error, ErrorKind, Result};
use crate::{PathGenerator, WorkFolder};
use async_trait::async_trait;
use dlorg_cache::CachedFetcher;
use dlorg_cache::error::Result as CacheResult;
use dlorg_extract::models::{WorkId, WorkMetadata};
use dlorg_fetch::Fetcher;
use dlorg_storage::StorageBackend;
use exn::ResultExt;
use std::path::PathBuf;
use tracing::{debug, instrument, warn};

/// Turns a [`WorkId`] into [`WorkMetadata`] for the planner.
///
/// Errors for which
/// [`is_item_failure`](dlorg_cache::error::ErrorKind::is_item_failure) is
/// `true` only fail that one work; any other error aborts planning.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, id: &WorkId) -> CacheResult<WorkMetadata>;
}

#[async_trait]
impl<F: Fetcher> Resolver for CachedFetcher<F> {
    async fn resolve(&self, id: &WorkId) -> CacheResult<WorkMetadata> {
        self.get(id).await
    }
}

/// A single planned move, relative to the storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub id: WorkId,
}

/// A work that will not be moved, and why.
#[derive(Debug)]
pub struct PlanFailure {
    pub source: PathBuf,
    pub id: WorkId,
    pub error: Error,
}

/// Everything [`plan`] decided.
///
/// Executing `renames` in order never moves anything onto an existing path
/// or onto another rename's destination. Works that are already in place
/// appear in neither list.
#[derive(Debug, Default)]
pub struct Plan {
    pub renames: Vec<Rename>,
    pub failures: Vec<PlanFailure>,
}
impl Plan {
    pub fn is_empty(&self) -> bool {
        self.renames.is_empty() && self.failures.is_empty()
    }
}

/// Computes where every work in `works` should be moved.
///
/// 1. Each work is resolved and its destination rendered. Fetch and template
///    failures, and destinations that would land inside a discovered work
///    folder, are recorded in [`Plan::failures`].
/// 2. Works already at their destination, or at a ` (n)` variant of it,
///    claim their current path and are left alone.
/// 3. The rest, ordered by destination then source, take the first variant
///    that is unclaimed, doesn't overlap a claimed path and doesn't exist.
///    If the backend can't answer whether a candidate exists, that work is
///    recorded as a [`ErrorKind::Storage`] failure.
///
/// Nothing is modified: the backend is only asked whether paths exist.
///
/// # Errors
/// [`ErrorKind::Cache`] if the resolver's store fails.
#[instrument(skip_all, fields(works = works.len(), backend = backend.name()))]
pub async fn plan(
    works: &[WorkFolder],
    resolver: &dyn Resolver,
    generator: &PathGenerator,
    backend: &dyn StorageBackend,
) -> Result<Plan> {
    let mut plan = Plan::default();

    let mut wanted = Vec::with_capacity(works.len());
    for work in works {
        match destination(work, works, resolver, generator).await {
            Ok(destination) => wanted.push((destination, work)),
            Err(e) if e.is_item_failure() => plan.failures.push(failure(work, e)),
            Err(e) => return Err(e),
        }
    }

    let mut claims = Claims::default();
    let mut pending = Vec::with_capacity(wanted.len());
    for (destination, work) in wanted {
        if work.path == destination || is_variant_of(&work.path, &destination) {
            debug!(path = %work.path.display(), "already in place");
            claims.claim(&work.path);
        } else {
            pending.push((destination, work));
        }
    }

    pending.sort_by(|(a, work_a), (b, work_b)| a.cmp(b).then_with(|| work_a.path.cmp(&work_b.path)));
    for (destination, work) in pending {
        match claims.first_free(backend, &destination).await {
            Ok(Some(free)) => {
                claims.claim(&free);
                plan.renames.push(Rename {
                    source: work.path.clone(),
                    destination: free,
                    id: work.id.clone(),
                });
            },
            Ok(None) => plan.failures.push(failure(work, Error::from(ErrorKind::Conflict))),
            Err(e) => plan.failures.push(failure(work, e)),
        }
    }
    Ok(plan)
}

async fn destination(
    work: &WorkFolder,
    works: &[WorkFolder],
    resolver: &dyn Resolver,
    generator: &PathGenerator,
) -> Result<PathBuf> {
    let metadata = resolver.resolve(&work.id).await.map_err(|e| {
        let kind = if e.is_item_failure() { ErrorKind::Fetch } else { ErrorKind::Cache };
        e.raise(kind)
    })?;
    let destination = generator.generate(&metadata).or_raise(|| ErrorKind::Template)?;
    // Moving a work inside a work folder (possibly its own) can't be undone
    // by organizing again, since discovery never looks inside work folders.
    if works.iter().any(|other| destination != other.path && destination.starts_with(&other.path)) {
        exn::bail!(ErrorKind::Conflict);
    }
    Ok(destination)
}

fn failure(work: &WorkFolder, error: Error) -> PlanFailure {
    warn!(path = %work.path.display(), id = %work.id, error = %error, "cannot organize work");
    PlanFailure {
        source: work.path.clone(),
        id: work.id.clone(),
        error,
    }
}
