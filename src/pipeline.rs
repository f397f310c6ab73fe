use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ScoutConfig;
use crate::error::Result;
use crate::extract::DetailExtractor;
use crate::lookup::SoldLookup;
use crate::models::{DealReport, ListingStatus, RawListing};
use crate::scoring::{rank, score, YEAR_WINDOW};
use crate::scrapers::{ListingFilter, ScraperTrait, VehicleIdentity};

/// Scrape, enrich, look up comparables, score and rank.
pub struct DealFinder {
    scraper: Arc<dyn ScraperTrait>,
    extractor: DetailExtractor,
    lookup: Arc<dyn SoldLookup>,
    max_in_flight: usize,
    ending_within: Duration,
}

impl DealFinder {
    pub fn new(
        scraper: Arc<dyn ScraperTrait>,
        extractor: DetailExtractor,
        lookup: Arc<dyn SoldLookup>,
    ) -> Self {
        Self {
            scraper,
            extractor,
            lookup,
            max_in_flight: 8,
            ending_within: Duration::hours(24),
        }
    }

    /// Take the enrichment bound and candidate window from `config`.
    pub fn configured(mut self, config: &ScoutConfig) -> Self {
        self.max_in_flight = config.enrichment.max_in_flight;
        self.ending_within = Duration::hours(config.deals.ending_within_hours);
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn with_ending_within(mut self, window: Duration) -> Self {
        self.ending_within = window;
        self
    }

    pub async fn find_deals(&self, filter: &ListingFilter) -> Result<DealReport> {
        self.find_deals_at(filter, Utc::now()).await
    }

    /// Run the pipeline as of `now`. A failed index scrape is an error;
    /// failures after that only drop the affected candidate.
    pub async fn find_deals_at(&self, filter: &ListingFilter, now: DateTime<Utc>) -> Result<DealReport> {
        let active_filter = ListingFilter {
            status: ListingStatus::Active,
            ..filter.clone()
        };

        info!("Scraping active listings from {}", self.scraper.source_name());
        let active = self.scraper.scrape(&active_filter).await?;

        let mut candidates: Vec<RawListing> = active
            .into_iter()
            .filter(|listing| self.in_window(listing, now))
            .collect();
        info!(
            "{} candidates end within {} hours",
            candidates.len(),
            self.ending_within.num_hours()
        );

        let details = self.extractor.enrich_all(&candidates, self.max_in_flight).await;
        for (listing, detail) in candidates.iter_mut().zip(details) {
            if !detail.is_empty() {
                listing.details = Some(detail);
            }
        }

        let mut deals = Vec::new();
        for listing in &candidates {
            let identity = VehicleIdentity::of(listing);
            let (Some(make), Some(model), Some(year)) = (&identity.make, &identity.model, identity.year) else {
                debug!("Skipping {}: make/model/year unknown ({:?})", listing.title, identity);
                continue;
            };

            let comparables = match self
                .lookup
                .lookup_sold(make, model, year - YEAR_WINDOW, year + YEAR_WINDOW)
                .await
            {
                Ok(comparables) => comparables,
                Err(e) => {
                    warn!("Historical lookup failed for {}: {}", listing.title, e);
                    continue;
                }
            };

            match score(listing, &comparables, now) {
                Some(deal) => {
                    debug!("{} scored {}", listing.title, deal.deal_score);
                    deals.push(deal);
                }
                None => debug!("No sold comparables for {}", listing.title),
            }
        }

        let deals = rank(deals);
        info!("Found {} deals among {} candidates", deals.len(), candidates.len());

        Ok(DealReport {
            generated_at: now,
            candidates_considered: candidates.len(),
            deals,
        })
    }

    /// Still running and ending within the configured window.
    fn in_window(&self, listing: &RawListing, now: DateTime<Utc>) -> bool {
        listing.end_time().is_some_and(|end| {
            let remaining = end - now;
            remaining > Duration::zero() && remaining <= self.ending_within
        })
    }
}
