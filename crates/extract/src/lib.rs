mod consts;
pub mod error;
mod extract;
pub mod models;

use tracing::instrument;

use crate::error::Result;
pub use crate::extract::{Extractor, Outline};
use crate::models::{WorkId, WorkMetadata};

/// Easy, top-level entrypoint for the extraction of [`WorkMetadata`] from a
/// fetched work page.
///
/// See [`Extractor`] for more details.
#[instrument(skip(html), fields(html_size = html.as_ref().len()))]
pub fn extract(html: impl AsRef<str>, id: WorkId) -> Result<WorkMetadata> {
    Extractor::from_html(html.as_ref()).metadata(id)
}
