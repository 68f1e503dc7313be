use super::WorkId;

/// Storefront metadata for a single work.
///
/// Fetched once per [`WorkId`] and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkMetadata {
    /// Catalog code the metadata was fetched for
    pub id: WorkId,
    /// Display name of the work
    pub name: String,
    /// Publisher (circle/brand) name
    pub maker: String,
    /// Series the work belongs to, if any
    pub series: Option<String>,
}
