use async_trait::async_trait;

use crate::error::Result;
use crate::models::RawListing;
use crate::scrapers::types::ListingFilter;

/// Common trait for all auction scrapers.
/// Callers stay polymorphic over the source, so downstream filtering and
/// scoring never care where a listing came from.
#[async_trait]
pub trait ScraperTrait: Send + Sync {
    /// Scrape listings matching `filter`, in the order the site shows them.
    /// Every call fetches fresh. A failed index fetch is an error, never an
    /// empty list.
    async fn scrape(&self, filter: &ListingFilter) -> Result<Vec<RawListing>>;

    /// Get the name of the scraper source
    fn source_name(&self) -> &'static str;
}
