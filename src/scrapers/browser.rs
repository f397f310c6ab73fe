use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Duration as TimeDelta, Utc};
use headless_chrome::{Browser, LaunchOptions};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::extract::page::element_text;
use crate::models::{ListingStatus, RawListing, RawValue, Source};
use crate::scrapers::traits::ScraperTrait;
use crate::scrapers::types::ListingFilter;

pub const BASE_URL: &str = "https://carsandbids.com";

mod selectors {
    use super::*;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    pub static CARD: LazyLock<Selector> = LazyLock::new(|| sel("li.auction-item"));
    pub static TITLE_LINK: LazyLock<Selector> = LazyLock::new(|| sel(".auction-title a"));
    pub static BID: LazyLock<Selector> = LazyLock::new(|| sel(".bid-value"));
    pub static TIME_LEFT: LazyLock<Selector> = LazyLock::new(|| sel(".time-left .value, .ending"));
    pub static IMAGE: LazyLock<Selector> = LazyLock::new(|| sel("img"));
}

mod patterns {
    use super::*;

    pub static DAYS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,3})\s*days?\b").unwrap());
    pub static HMS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\b(\d{1,2}):(\d{2}):(\d{2})\b").unwrap());
    pub static MS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").unwrap());
    pub static SOLD_FOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bsold\s+for\b").unwrap());
}

/// Browser-based scraper for Cars & Bids using headless Chrome.
/// The index is rendered client-side, so plain HTTP fetches see no cards.
pub struct CarsAndBidsBrowserScraper {
    base_url: String,
    headless: bool,
    settle_time: Duration,
}

impl Default for CarsAndBidsBrowserScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl CarsAndBidsBrowserScraper {
    pub fn new() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            headless: true,
            settle_time: Duration::from_secs(5),
        }
    }

    /// How long to let client-side rendering finish after navigation.
    pub fn with_settle_time(mut self, settle_time: Duration) -> Self {
        self.settle_time = settle_time;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    fn index_url(&self, filter: &ListingFilter) -> String {
        if filter.wants_completed() {
            format!("{}/past-auctions/", self.base_url)
        } else {
            format!("{}/", self.base_url)
        }
    }
}

/// Launch Chrome, load `url`, and return the rendered document. Blocking.
fn render_page(url: &str, headless: bool, settle_time: Duration) -> anyhow::Result<String> {
    info!("Launching headless Chrome...");

    let options = LaunchOptions::default_builder()
        .headless(headless)
        .build()
        .context("Failed to build launch options")?;

    let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
    let tab = browser.new_tab().context("Failed to open tab")?;

    tab.navigate_to(url)
        .with_context(|| format!("Failed to navigate to {url}"))?;
    tab.wait_until_navigated()
        .with_context(|| format!("Navigation to {url} did not finish"))?;

    if tab
        .wait_for_element_with_custom_timeout("li.auction-item", settle_time)
        .is_err()
    {
        warn!("No auction cards rendered within {:?}", settle_time);
    }
    // Lazy-loaded card details arrive shortly after the first card.
    thread::sleep(Duration::from_millis(500));

    let html_result = tab
        .evaluate("document.documentElement.outerHTML", false)
        .context("Failed to read page HTML")?;
    let html = html_result
        .value
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default();

    debug!("Rendered {} bytes of HTML from {}", html.len(), url);
    Ok(html)
}

#[async_trait]
impl ScraperTrait for CarsAndBidsBrowserScraper {
    async fn scrape(&self, filter: &ListingFilter) -> Result<Vec<RawListing>> {
        let url = self.index_url(filter);
        info!("Starting Cars & Bids scrape: {}", url);

        let headless = self.headless;
        let settle_time = self.settle_time;
        let render_url = url.clone();
        let html = tokio::task::spawn_blocking(move || render_page(&render_url, headless, settle_time))
            .await?
            .map_err(|e| Error::Browser(format!("{e:#}")))?;

        if html.is_empty() {
            return Err(Error::Browser(format!("{url} rendered an empty document")));
        }

        let parsed = parse_cards(&html, filter.wants_completed(), &self.base_url, Utc::now());
        let total = parsed.len();
        let listings: Vec<RawListing> = parsed.into_iter().filter(|l| filter.matches(l)).collect();

        info!(
            "Scraped {} Cars & Bids listings ({} after filtering)",
            total,
            listings.len()
        );
        Ok(listings)
    }

    fn source_name(&self) -> &'static str {
        Source::CarsAndBids.name()
    }
}

/// Turn a card countdown ("2 Days", "4:12:09", "12:09") into an end time.
pub fn parse_time_left(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let seconds = if let Some(caps) = patterns::DAYS.captures(text) {
        caps[1].parse::<i64>().ok()? * 86_400
    } else if let Some(caps) = patterns::HMS.captures(text) {
        let h: i64 = caps[1].parse().ok()?;
        let m: i64 = caps[2].parse().ok()?;
        let s: i64 = caps[3].parse().ok()?;
        h * 3600 + m * 60 + s
    } else if let Some(caps) = patterns::MS.captures(text) {
        let m: i64 = caps[1].parse().ok()?;
        let s: i64 = caps[2].parse().ok()?;
        m * 60 + s
    } else {
        return None;
    };
    Some(now + TimeDelta::seconds(seconds))
}

fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

fn parse_cards(html: &str, completed: bool, base_url: &str, now: DateTime<Utc>) -> Vec<RawListing> {
    let document = Html::parse_document(html);
    let cards: Vec<_> = document.select(&selectors::CARD).collect();
    debug!("Found {} auction cards in HTML", cards.len());

    let mut listings = Vec::with_capacity(cards.len());
    for (idx, card) in cards.into_iter().enumerate() {
        let Some(link) = card.select(&selectors::TITLE_LINK).next() else {
            debug!("Skipped card {}: no title link", idx);
            continue;
        };
        let title = element_text(link);
        let href = link.value().attr("href").unwrap_or_default();
        if title.is_empty() || href.is_empty() {
            debug!("Skipped card {}: title='{}', href='{}'", idx, title, href);
            continue;
        }

        let url = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{}/{}", base_url, href.trim_start_matches('/'))
        };

        let status = if !completed {
            ListingStatus::Active
        } else if patterns::SOLD_FOR.is_match(&element_text(card)) {
            ListingStatus::Sold
        } else {
            ListingStatus::NotSold
        };

        let mut listing = RawListing::new(title, url, status);
        listing.source = Some(Source::CarsAndBids);
        listing.images = card
            .select(&selectors::IMAGE)
            .filter_map(|img| img.value().attr("src"))
            .map(str::to_string)
            .collect();

        let bid = first_text(card, &selectors::BID);
        match status {
            ListingStatus::Sold => listing.sold_price = bid,
            _ => listing.bid_amount = bid,
        }
        if status == ListingStatus::Active {
            listing.end_date = first_text(card, &selectors::TIME_LEFT)
                .and_then(|left| parse_time_left(&left, now))
                .map(|end| RawValue::Text(end.to_rfc3339()));
        }

        listings.push(listing);
    }
    listings
}
