pub mod page;
pub mod rules;
pub mod title;

pub use page::ListingPage;
pub use rules::{first_match, Rule};
pub use title::{extract_mileage_from_title, parse_title, TitleParts};

use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::http::HttpFetch;
use crate::models::{ListingDetail, RawListing};

/// Pull every secondary attribute out of a listing page. Never fails:
/// attributes the page does not show are left unset.
pub fn extract_details(html: &str) -> ListingDetail {
    let page = ListingPage::parse(html);
    ListingDetail {
        mileage: first_match(rules::MILEAGE_RULES, &page),
        bidders: first_match(rules::BIDDER_RULES, &page),
        watchers: first_match(rules::WATCHER_RULES, &page),
        comments: first_match(rules::COMMENT_RULES, &page),
        transmission: first_match(rules::TRANSMISSION_RULES, &page),
        exterior_color: first_match(rules::COLOR_RULES, &page),
    }
}

/// Fetches listing pages and extracts their details
#[derive(Clone)]
pub struct DetailExtractor {
    fetcher: Arc<dyn HttpFetch>,
}

impl DetailExtractor {
    pub fn new(fetcher: Arc<dyn HttpFetch>) -> Self {
        Self { fetcher }
    }

    /// Fetch and extract, surfacing fetch failures.
    pub async fn try_fetch_details(&self, url: &str) -> Result<ListingDetail, FetchError> {
        let html = self.fetcher.get(url).await?;
        Ok(extract_details(&html))
    }

    /// Fetch and extract. A failed fetch is logged and yields an empty detail.
    pub async fn fetch_details(&self, url: &str) -> ListingDetail {
        match self.try_fetch_details(url).await {
            Ok(detail) => {
                debug!("Extracted details for {}: {:?}", url, detail);
                detail
            }
            Err(e) => {
                warn!("Skipping details for {}: {}", url, e);
                ListingDetail::default()
            }
        }
    }

    /// Fetch details for every listing with at most `max_in_flight` requests
    /// open at once. Results come back in input order; a failed page only
    /// empties its own entry.
    pub async fn enrich_all(&self, listings: &[RawListing], max_in_flight: usize) -> Vec<ListingDetail> {
        info!(
            "Enriching {} listings ({} concurrent requests)",
            listings.len(),
            max_in_flight
        );

        let mut results: Vec<(usize, ListingDetail)> = stream::iter(listings.iter().enumerate())
            .map(|(i, listing)| async move { (i, self.fetch_details(&listing.url).await) })
            .buffer_unordered(max_in_flight.max(1))
            .collect()
            .await;

        results.sort_by_key(|(i, _)| *i);
        results.into_iter().map(|(_, detail)| detail).collect()
    }
}
