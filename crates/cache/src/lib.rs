//! Persistent metadata cache.
//!
//! Wraps a [`Fetcher`](dlorg_fetch::Fetcher) so that each work is fetched from
//! the storefront at most once. Fetched metadata is stored in a SQLite
//! database and survives process restarts. Entries are never updated in
//! place; use [`CachedFetcher::forget`] to force a refetch.

mod db;
pub mod error;
mod fetcher;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::fetcher::CachedFetcher;
pub use crate::repo::Repository;
