//! Main extraction logic for storefront work pages.

mod outline;

pub use self::outline::Outline;
use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::{WorkId, WorkMetadata};
use exn::OptionExt;
use scraper::{ElementRef, Html};
use tracing::instrument;

#[derive(Debug)]
pub struct Extractor {
    document: Html,
}
impl Extractor {
    pub fn from_document(document: Html) -> Self {
        Self { document }
    }

    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        Self::from_document(document)
    }

    /// Returns `true` if the document looks like a work (or announce) page.
    pub fn is_valid(&self) -> bool {
        self.document.select(&consts::WORK_NAME_SELECTOR).next().is_some()
    }

    /// Extracts work metadata from a product or announce page.
    ///
    /// The page itself doesn't reliably carry the catalog code in a parseable
    /// place, so the caller supplies the code it requested the page for.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The HTML is not a work page ([`ErrorKind::InvalidDocument`])
    /// - The work name or maker cannot be found ([`ErrorKind::MissingField`])
    ///
    /// A missing series is not an error.
    #[instrument(skip(self), fields(id = %id))]
    pub fn metadata(self, id: WorkId) -> Result<WorkMetadata> {
        // Check for the name element first, it's equivalent to quickly
        // checking the HTML document validity.
        let name = self.document.select(&consts::WORK_NAME_SELECTOR).next().ok_or_raise(|| ErrorKind::InvalidDocument)?;
        let outline = self.outline();
        Ok(WorkMetadata {
            id,
            name: Self::name(name).ok_or_raise(|| ErrorKind::MissingField("name"))?,
            maker: self.maker().ok_or_raise(|| ErrorKind::MissingField("maker"))?,
            series: outline.series(),
        })
    }

    /// Older pages wrap the name in a link that may also contain label
    /// elements, in which case the trailing text node is the name. Newer pages
    /// put the name directly in the heading.
    fn name(element: ElementRef<'_>) -> Option<String> {
        let linked = element.select(&consts::ANCHOR_SELECTOR).next().and_then(|a| {
            a.children()
                .filter_map(|node| node.value().as_text())
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
                .last()
        });
        linked.or_else(|| Some(element.text().collect::<String>().trim().to_string())).filter(|s| !s.is_empty())
    }

    fn maker(&self) -> Option<String> {
        self.document
            .select(&consts::MAKER_SELECTOR)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn outline(&self) -> Outline<'_> {
        Outline::new(&self.document)
    }
}
