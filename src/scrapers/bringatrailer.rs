use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::extract::page::element_text;
use crate::http::HttpFetch;
use crate::models::{ListingStatus, RawListing, RawValue, Source};
use crate::scrapers::traits::ScraperTrait;
use crate::scrapers::types::ListingFilter;

pub const BASE_URL: &str = "https://bringatrailer.com";

mod patterns {
    use super::*;

    pub static EMBEDDED_DATA: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?:var|let|const)\s+auctions(?:Current|Completed)InitialData\s*=\s*").unwrap()
    });

    pub static SOLD_FOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bsold\s+for\b").unwrap());

    pub static AMOUNT: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\$\s?\d[\d,]*(?:\.\d{2})?").unwrap());

    pub static ON_DATE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)\bon\s+(\d{1,2}/\d{1,2}/\d{2,4})").unwrap());
}

mod selectors {
    use super::*;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    pub static CARD: LazyLock<Selector> = LazyLock::new(|| sel("a.listing-card"));
    pub static CARD_TITLE: LazyLock<Selector> = LazyLock::new(|| sel("h3"));
    pub static CARD_BID: LazyLock<Selector> = LazyLock::new(|| sel(".bid-formatted"));
    pub static CARD_RESULT: LazyLock<Selector> = LazyLock::new(|| sel(".item-results"));
    pub static CARD_IMAGE: LazyLock<Selector> = LazyLock::new(|| sel("img"));
    pub static MAKE_LINK: LazyLock<Selector> = LazyLock::new(|| sel("a.models-page-make-title-link"));
}

/// Top level of the JSON blob Bring a Trailer embeds in its index pages
#[derive(Debug, Deserialize)]
struct EmbeddedPayload {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// One auction as it appears in the embedded payload
#[derive(Debug, Deserialize)]
struct EmbeddedItem {
    title: String,
    url: String,
    #[serde(default)]
    year: Option<RawValue>,
    #[serde(default)]
    current_bid: Option<f64>,
    #[serde(default)]
    current_bid_formatted: Option<String>,
    #[serde(default)]
    timestamp_end: Option<f64>,
    #[serde(default)]
    sold_text: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
}

/// Bring a Trailer scraper: active auctions and completed results
pub struct BringATrailerScraper {
    fetcher: Arc<dyn HttpFetch>,
    base_url: String,
}

impl BringATrailerScraper {
    pub fn new(fetcher: Arc<dyn HttpFetch>) -> Self {
        Self::with_base_url(fetcher, BASE_URL)
    }

    /// Point the scraper at another host, e.g. a local fixture server.
    pub fn with_base_url(fetcher: Arc<dyn HttpFetch>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { fetcher, base_url }
    }

    /// Index page for `filter`. Completed results accept a search term.
    fn index_url(&self, filter: &ListingFilter) -> Result<String> {
        if !filter.wants_completed() {
            return Ok(format!("{}/auctions/", self.base_url));
        }
        let results = format!("{}/auctions/results/", self.base_url);
        let url = match filter.search_query() {
            Some(query) => Url::parse_with_params(&results, &[("search", query)]),
            None => Url::parse(&results),
        }
        .map_err(|e| Error::InvalidUrl(format!("{results}: {e}")))?;
        Ok(url.to_string())
    }

    /// Every make in the site's model catalogue, trimmed, in page order.
    pub async fn scrape_makes(&self) -> Result<Vec<String>> {
        let url = format!("{}/models/", self.base_url);
        info!("Fetching make catalogue from {}", url);

        let html = self.fetcher.get(&url).await?;
        let makes = parse_makes(&html);

        info!("Found {} makes", makes.len());
        Ok(makes)
    }
}

#[async_trait]
impl ScraperTrait for BringATrailerScraper {
    async fn scrape(&self, filter: &ListingFilter) -> Result<Vec<RawListing>> {
        let url = self.index_url(filter)?;
        info!("Starting Bring a Trailer scrape: {}", url);

        let html = self.fetcher.get(&url).await?;
        debug!("Downloaded {} bytes of HTML", html.len());

        let parsed = parse_index(&html, filter.wants_completed(), &self.base_url);
        let total = parsed.len();
        let listings: Vec<RawListing> = parsed.into_iter().filter(|l| filter.matches(l)).collect();

        if total == 0 {
            warn!("No listings found on {}", url);
        }
        info!(
            "Scraped {} Bring a Trailer listings ({} after filtering)",
            total,
            listings.len()
        );
        Ok(listings)
    }

    fn source_name(&self) -> &'static str {
        Source::BringATrailer.name()
    }
}

/// Listings from an index page: the embedded payload when present, the
/// rendered cards otherwise.
fn parse_index(html: &str, completed: bool, base_url: &str) -> Vec<RawListing> {
    match parse_embedded(html, completed) {
        Some(listings) if !listings.is_empty() => listings,
        _ => {
            debug!("No embedded auction data, falling back to listing cards");
            parse_cards(html, completed, base_url)
        }
    }
}

fn parse_embedded(html: &str, completed: bool) -> Option<Vec<RawListing>> {
    let start = patterns::EMBEDDED_DATA.find(html)?.end();

    // Only the first JSON value after the assignment is read; the rest of the
    // script is ignored.
    let payload = match serde_json::Deserializer::from_str(&html[start..])
        .into_iter::<EmbeddedPayload>()
        .next()?
    {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Embedded auction data is not valid JSON: {}", e);
            return None;
        }
    };

    let mut listings = Vec::with_capacity(payload.items.len());
    for (idx, value) in payload.items.into_iter().enumerate() {
        match serde_json::from_value::<EmbeddedItem>(value) {
            Ok(item) => listings.push(embedded_to_listing(item, completed)),
            Err(e) => debug!("Skipped embedded item {}: {}", idx, e),
        }
    }
    Some(listings)
}

fn embedded_to_listing(item: EmbeddedItem, completed: bool) -> RawListing {
    let status = completed_status(item.sold_text.as_deref(), completed);
    let mut listing = RawListing::new(item.title.trim(), item.url, status);
    listing.source = Some(Source::BringATrailer);
    listing.year = item.year;
    listing.end_date = item.timestamp_end.map(RawValue::Number);
    listing.images = item.thumbnail_url.into_iter().collect();

    match status {
        ListingStatus::Active => {
            listing.current_bid = item.current_bid;
            listing.bid_amount = item.current_bid_formatted;
        }
        ListingStatus::Sold => {
            let text = item.sold_text.as_deref().unwrap_or_default();
            listing.sold_price = result_amount(text).or(item.current_bid_formatted);
            listing.price = item.current_bid;
            listing.sold_date = result_date(text);
        }
        ListingStatus::NotSold => {
            let text = item.sold_text.as_deref().unwrap_or_default();
            listing.bid_amount = result_amount(text).or(item.current_bid_formatted);
            listing.current_bid = item.current_bid;
        }
    }
    listing
}

/// "Sold for USD $61,000 on 10/17/25" is a sale; "Bid to USD $45,000" is not.
fn completed_status(result_text: Option<&str>, completed: bool) -> ListingStatus {
    if !completed {
        return ListingStatus::Active;
    }
    match result_text {
        Some(text) if patterns::SOLD_FOR.is_match(text) => ListingStatus::Sold,
        _ => ListingStatus::NotSold,
    }
}

fn result_amount(text: &str) -> Option<String> {
    patterns::AMOUNT.find(text).map(|m| m.as_str().replace(' ', ""))
}

fn result_date(text: &str) -> Option<String> {
    patterns::ON_DATE.captures(text).map(|caps| caps[1].to_string())
}

fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}/{}", base_url, href.trim_start_matches('/'))
    }
}

fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

fn parse_cards(html: &str, completed: bool, base_url: &str) -> Vec<RawListing> {
    let document = Html::parse_document(html);
    let cards: Vec<_> = document.select(&selectors::CARD).collect();
    debug!("Found {} listing cards in HTML", cards.len());

    let mut listings = Vec::with_capacity(cards.len());
    for (idx, card) in cards.into_iter().enumerate() {
        let href = card.value().attr("href").unwrap_or_default();
        let Some(title) = first_text(card, &selectors::CARD_TITLE) else {
            debug!("Skipped card {}: no title", idx);
            continue;
        };
        if href.is_empty() {
            debug!("Skipped card {} ({}): no link", idx, title);
            continue;
        }

        let result = first_text(card, &selectors::CARD_RESULT);
        let status = completed_status(result.as_deref(), completed);
        let mut listing = RawListing::new(title, absolute_url(base_url, href), status);
        listing.source = Some(Source::BringATrailer);
        listing.end_date = card
            .value()
            .attr("data-timestamp-end")
            .and_then(|ts| ts.parse::<f64>().ok())
            .map(RawValue::Number);
        listing.images = card
            .select(&selectors::CARD_IMAGE)
            .filter_map(|img| img.value().attr("src"))
            .map(str::to_string)
            .collect();

        let bid = first_text(card, &selectors::CARD_BID);
        let result_text = result.unwrap_or_default();
        match status {
            ListingStatus::Active => listing.bid_amount = bid,
            ListingStatus::Sold => {
                listing.sold_price = result_amount(&result_text).or(bid);
                listing.sold_date = result_date(&result_text);
            }
            ListingStatus::NotSold => listing.bid_amount = result_amount(&result_text).or(bid),
        }
        listings.push(listing);
    }
    listings
}

fn parse_makes(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&selectors::MAKE_LINK)
        .map(element_text)
        .filter(|make| !make.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use std::collections::HashMap;

    /// Serves canned pages; anything else is a 404.
    struct StaticFetcher {
        pages: HashMap<String, String>,
    }

    impl StaticFetcher {
        fn new(pages: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                pages: pages.iter().map(|(u, b)| (u.to_string(), b.to_string())).collect(),
            })
        }
    }

    #[async_trait]
    impl HttpFetch for StaticFetcher {
        async fn get(&self, url: &str) -> std::result::Result<String, FetchError> {
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    const ACTIVE_PAGE: &str = r#"<html><head><script>
        var auctionsCurrentInitialData = {"items":[
          {"title":"1988 Porsche 911 Carrera Coupe","url":"https://bringatrailer.com/listing/1988-porsche-911-carrera-coupe-12/",
           "year":"1988","current_bid":61000,"current_bid_formatted":"USD $61,000","timestamp_end":1760727600,
           "thumbnail_url":"https://bringatrailer.com/img/911.jpg"},
          {"url":"https://bringatrailer.com/listing/broken/"},
          {"title":"1991 BMW M3","url":"https://bringatrailer.com/listing/1991-bmw-m3-7/","current_bid":82500,"timestamp_end":1760814000}
        ]};
        var somethingElse = {"a": 1};
    </script></head><body></body></html>"#;

    const RESULTS_PAGE: &str = r#"<html><body>
        <a class="listing-card" href="/listing/1987-porsche-911-carrera-31/">
          <img src="https://bringatrailer.com/img/a.jpg">
          <h3>1987 Porsche 911 Carrera Targa</h3>
          <div class="item-results">Sold for USD $58,500 on 10/1/25</div>
        </a>
        <a class="listing-card" href="/listing/1986-porsche-911-carrera-9/">
          <h3>1986 Porsche 911 Carrera Coupe</h3>
          <div class="item-results">Bid to USD $40,000 on 9/28/25</div>
        </a>
        <a class="listing-card" href="/listing/no-title/"><div>?</div></a>
    </body></html>"#;

    #[tokio::test]
    async fn parses_embedded_active_auctions() {
        let fetcher = StaticFetcher::new(&[("https://bat.test/auctions/", ACTIVE_PAGE)]);
        let scraper = BringATrailerScraper::with_base_url(fetcher, "https://bat.test/");

        let listings = scraper.scrape(&ListingFilter::default()).await.unwrap();

        assert_eq!(listings.len(), 2, "item without a title is skipped");
        let porsche = &listings[0];
        assert_eq!(porsche.title, "1988 Porsche 911 Carrera Coupe");
        assert_eq!(porsche.status, ListingStatus::Active);
        assert_eq!(porsche.current_bid_amount(), Some(61_000.0));
        assert_eq!(porsche.end_time().map(|t| t.timestamp()), Some(1_760_727_600));
        assert_eq!(porsche.images.len(), 1);
        assert_eq!(listings[1].title, "1991 BMW M3");
    }

    #[tokio::test]
    async fn parses_result_cards_and_filters() {
        let fetcher = StaticFetcher::new(&[(
            "https://bat.test/auctions/results/?search=Porsche+911",
            RESULTS_PAGE,
        )]);
        let scraper = BringATrailerScraper::with_base_url(fetcher, "https://bat.test");
        let filter = ListingFilter::completed("Porsche", "911", 1985, 1989);

        let listings = scraper.scrape(&filter).await.unwrap();

        assert_eq!(listings.len(), 2);
        let sold = &listings[0];
        assert_eq!(sold.status, ListingStatus::Sold);
        assert_eq!(sold.url, "https://bat.test/listing/1987-porsche-911-carrera-31/");
        assert_eq!(sold.resolved_sold_price(), Some(58_500.0));
        assert_eq!(sold.sold_date.as_deref(), Some("10/1/25"));
        assert_eq!(listings[1].status, ListingStatus::NotSold);
        assert_eq!(listings[1].resolved_sold_price(), None);
    }

    #[tokio::test]
    async fn index_failure_is_an_error() {
        let fetcher = StaticFetcher::new(&[]);
        let scraper = BringATrailerScraper::with_base_url(fetcher, "https://bat.test");

        let err = scraper.scrape(&ListingFilter::default()).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn empty_page_is_an_empty_success() {
        let fetcher = StaticFetcher::new(&[("https://bat.test/auctions/", "<html></html>")]);
        let scraper = BringATrailerScraper::with_base_url(fetcher, "https://bat.test");

        assert!(scraper.scrape(&ListingFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scrapes_make_catalogue() {
        let page = r#"<html><body>
            <a class="models-page-make-title-link" href="/acura/"> Acura </a>
            <a class="models-page-make-title-link" href="/alfa-romeo/">Alfa Romeo</a>
            <a class="other-link" href="/about/">About</a>
        </body></html>"#;
        let fetcher = StaticFetcher::new(&[("https://bat.test/models/", page)]);
        let scraper = BringATrailerScraper::with_base_url(fetcher, "https://bat.test");

        assert_eq!(scraper.scrape_makes().await.unwrap(), vec!["Acura", "Alfa Romeo"]);
    }

    #[test]
    fn result_text_parsing() {
        assert_eq!(completed_status(Some("Sold for USD $12,000 on 1/2/24"), true), ListingStatus::Sold);
        assert_eq!(completed_status(Some("Bid to USD $9,000"), true), ListingStatus::NotSold);
        assert_eq!(completed_status(None, false), ListingStatus::Active);
        assert_eq!(result_amount("Sold for USD $12,000 on 1/2/24").as_deref(), Some("$12,000"));
        assert_eq!(result_date("Sold for USD $12,000 on 1/2/24").as_deref(), Some("1/2/24"));
    }
}
