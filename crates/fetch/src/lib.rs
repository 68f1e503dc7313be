//! Fetching work metadata from the storefront.
//!
//! The [`Fetcher`] trait is the seam between "something that can turn a
//! [`WorkId`] into [`WorkMetadata`]" and its consumers (the cache, the
//! planner). [`DlsiteFetcher`] is the real implementation: it downloads the
//! product page through a [`PageSource`], falling back to the announce page for
//! works that haven't been released yet, and hands the HTML to
//! [`dlorg_extract`].

mod dlsite;
pub mod error;
mod page;

pub use crate::dlsite::{DEFAULT_ANNOUNCE_URL, DEFAULT_WORK_URL, DlsiteFetcher, Endpoints};
pub use crate::page::{HttpPageSource, PageSource};
use crate::error::Result;
use async_trait::async_trait;
use dlorg_extract::models::{WorkId, WorkMetadata};

/// Resolves a [`WorkId`] to its [`WorkMetadata`].
///
/// Implementations block the caller until the lookup completes or fails;
/// there is no cancellation beyond what the transport provides.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, id: &WorkId) -> Result<WorkMetadata>;
}
