use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RawListing;

/// Summary of the sold prices of a set of comparables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    /// Mean weighted toward recent sales, outliers excluded. Informational;
    /// the deal score uses `mean`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recency_weighted_mean: Option<f64>,
}

/// A sold listing with its price resolved to a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalComparable {
    pub title: String,
    pub url: String,
    pub price: f64,
    pub sold_at: Option<DateTime<Utc>>,
}

impl HistoricalComparable {
    pub fn from_listing(listing: &RawListing, price: f64) -> Self {
        Self {
            title: listing.title.clone(),
            url: listing.url.clone(),
            price,
            sold_at: listing.sold_time(),
        }
    }
}

/// An active listing scored against its comparables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealResult {
    pub listing: RawListing,
    pub current_bid: f64,
    pub historical: PriceStats,
    pub price_difference: f64,
    pub percentage_difference: f64,
    /// 1 (overpriced) to 10 (underpriced)
    pub deal_score: u8,
    pub ending_soon: bool,
    /// Most recent sales first
    pub comparables: Vec<HistoricalComparable>,
}

/// Output of one deal-finding run. An empty `deals` list is a successful
/// run that found nothing worth scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealReport {
    pub generated_at: DateTime<Utc>,
    pub candidates_considered: usize,
    pub deals: Vec<DealResult>,
}
