use crate::error::{ErrorKind, Result};
use crate::{Fetcher, PageSource};
use async_trait::async_trait;
use dlorg_extract::models::{WorkId, WorkMetadata};
use exn::OptionExt;
use tracing::instrument;

const PLACEHOLDER: &str = "{id}";
pub const DEFAULT_WORK_URL: &str = "https://www.dlsite.com/maniax/work/=/product_id/{id}.html";
pub const DEFAULT_ANNOUNCE_URL: &str = "https://www.dlsite.com/maniax/announce/=/product_id/{id}.html";

/// URL templates for the product and announce pages. Each must contain an
/// `{id}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub work_url: String,
    pub announce_url: String,
}
impl Default for Endpoints {
    fn default() -> Self {
        Self {
            work_url: DEFAULT_WORK_URL.to_string(),
            announce_url: DEFAULT_ANNOUNCE_URL.to_string(),
        }
    }
}
impl Endpoints {
    pub fn work_url(&self, id: &WorkId) -> String {
        self.work_url.replace(PLACEHOLDER, id.as_str())
    }

    pub fn announce_url(&self, id: &WorkId) -> String {
        self.announce_url.replace(PLACEHOLDER, id.as_str())
    }
}

/// Fetches metadata from the storefront.
///
/// Lookup is a two-step protocol:
/// 1. Request the product page. If it exists, extract from it.
/// 2. If the product page is absent, request the announce page (works that
///    are announced but not yet released only have the latter).
///
/// Transport errors at either step are returned immediately; only absence
/// triggers the fallback. If both pages are absent the result is
/// [`ErrorKind::NotFound`].
pub struct DlsiteFetcher<P: PageSource> {
    source: P,
    endpoints: Endpoints,
}
impl<P: PageSource> DlsiteFetcher<P> {
    pub fn new(source: P, endpoints: Endpoints) -> Self {
        Self { source, endpoints }
    }

    async fn page(&self, id: &WorkId) -> Result<String> {
        if let Some(page) = self.source.get(&self.endpoints.work_url(id)).await? {
            return Ok(page);
        }
        tracing::debug!(%id, "Work page absent; trying announce page");
        self.source.get(&self.endpoints.announce_url(id)).await?.ok_or_raise(|| ErrorKind::NotFound(id.clone()))
    }
}

#[async_trait]
impl<P: PageSource> Fetcher for DlsiteFetcher<P> {
    #[instrument(skip(self), fields(id = %id))]
    async fn fetch(&self, id: &WorkId) -> Result<WorkMetadata> {
        let page = self.page(id).await?;
        dlorg_extract::extract(page, id.clone()).map_err(ErrorKind::extract)
    }
}
