//! Historical sold-price lookups used as comparables by the deal finder.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::RawListing;
use crate::scrapers::{ListingFilter, ScraperTrait};

/// Source of completed auctions for one make/model and year range.
#[async_trait]
pub trait SoldLookup: Send + Sync {
    async fn lookup_sold(
        &self,
        make: &str,
        model: &str,
        year_min: i32,
        year_max: i32,
    ) -> Result<Vec<RawListing>>;
}

/// Lookup backed by a scraper's completed-results pages.
pub struct ScraperSoldLookup {
    scraper: Arc<dyn ScraperTrait>,
}

impl ScraperSoldLookup {
    pub fn new(scraper: Arc<dyn ScraperTrait>) -> Self {
        Self { scraper }
    }
}

#[async_trait]
impl SoldLookup for ScraperSoldLookup {
    async fn lookup_sold(
        &self,
        make: &str,
        model: &str,
        year_min: i32,
        year_max: i32,
    ) -> Result<Vec<RawListing>> {
        let filter = ListingFilter::completed(make, model, year_min, year_max);
        debug!(
            "Looking up {} {} {}-{} on {}",
            make,
            model,
            year_min,
            year_max,
            self.scraper.source_name()
        );
        self.scraper
            .scrape(&filter)
            .await
            .map_err(|e| Error::Lookup(format!("{make} {model}: {e}")))
    }
}

/// Lookup over a fixed set of completed listings, typically a JSON export
/// of an earlier results scrape. Matching uses the same normalized
/// make/model/year rules as scraper filtering.
pub struct JsonHistoryLookup {
    listings: Vec<RawListing>,
}

impl JsonHistoryLookup {
    pub fn new(listings: Vec<RawListing>) -> Self {
        Self { listings }
    }

    /// Load a JSON array of listings.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        let listings: Vec<RawListing> = serde_json::from_str(&contents)?;
        info!("Loaded {} historical listings from {}", listings.len(), path.display());
        Ok(Self::new(listings))
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[async_trait]
impl SoldLookup for JsonHistoryLookup {
    async fn lookup_sold(
        &self,
        make: &str,
        model: &str,
        year_min: i32,
        year_max: i32,
    ) -> Result<Vec<RawListing>> {
        let filter = ListingFilter::completed(make, model, year_min, year_max);
        let matches: Vec<RawListing> = self
            .listings
            .iter()
            .filter(|listing| filter.matches(listing))
            .cloned()
            .collect();

        debug!("{} historical matches for {} {}", matches.len(), make, model);
        Ok(matches)
    }
}
