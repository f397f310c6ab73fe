use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use auction_scout::error::{Error, FetchError, Result};
use auction_scout::extract::DetailExtractor;
use auction_scout::http::HttpFetch;
use auction_scout::lookup::{JsonHistoryLookup, SoldLookup};
use auction_scout::models::{ListingStatus, RawListing, RawValue};
use auction_scout::scrapers::{ListingFilter, ScraperTrait};
use auction_scout::DealFinder;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 17, 12, 0, 0).unwrap()
}

/// Serves canned pages; anything else is a 404.
struct FakeFetcher {
    pages: HashMap<String, String>,
}

#[async_trait]
impl HttpFetch for FakeFetcher {
    async fn get(&self, url: &str) -> std::result::Result<String, FetchError> {
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

/// Returns a fixed set of active listings, or fails like a dead index page.
struct FakeScraper {
    listings: Option<Vec<RawListing>>,
}

#[async_trait]
impl ScraperTrait for FakeScraper {
    async fn scrape(&self, _filter: &ListingFilter) -> Result<Vec<RawListing>> {
        match &self.listings {
            Some(listings) => Ok(listings.clone()),
            None => Err(Error::Fetch(FetchError::Timeout {
                url: "https://auctions.test/".into(),
            })),
        }
    }

    fn source_name(&self) -> &'static str {
        "Fake"
    }
}

/// Delegates to an in-memory history, records each query and fails for one make.
struct RecordingLookup {
    history: JsonHistoryLookup,
    failing_make: &'static str,
    calls: Mutex<Vec<(String, String, i32, i32)>>,
}

#[async_trait]
impl SoldLookup for RecordingLookup {
    async fn lookup_sold(
        &self,
        make: &str,
        model: &str,
        year_min: i32,
        year_max: i32,
    ) -> Result<Vec<RawListing>> {
        self.calls
            .lock()
            .unwrap()
            .push((make.to_string(), model.to_string(), year_min, year_max));
        if make == self.failing_make {
            return Err(Error::Lookup("results page unavailable".into()));
        }
        self.history.lookup_sold(make, model, year_min, year_max).await
    }
}

fn active(title: &str, slug: &str, bid: f64, ends_in: Duration) -> RawListing {
    let mut listing = RawListing::new(
        title,
        format!("https://auctions.test/listing/{slug}/"),
        ListingStatus::Active,
    );
    listing.current_bid = Some(bid);
    listing.end_date = Some(RawValue::Number((now() + ends_in).timestamp() as f64));
    listing
}

fn sold(title: &str, price: &str, date: &str) -> RawListing {
    let mut listing = RawListing::new(title, "https://auctions.test/listing/sold/", ListingStatus::Sold);
    listing.sold_price = Some(price.to_string());
    listing.sold_date = Some(date.to_string());
    listing
}

fn history() -> Vec<RawListing> {
    vec![
        sold("1986 Porsche 911 Carrera", "$10,000", "2025-01-10"),
        sold("1987 Porsche 911 Carrera", "$12,000", "2025-02-10"),
        sold("1989 Porsche 911 Carrera", "$14,000", "2025-03-10"),
        sold("1990 Porsche 911 Carrera", "$16,000", "2025-04-10"),
        // Outside the +/-2 year window of a 1988 car.
        sold("1995 Porsche 911 Carrera", "$90,000", "2025-04-11"),
        sold("1990 BMW M3", "$30,000", "2025-05-01"),
    ]
}

const PORSCHE_PAGE: &str = r#"<html><body>
    <div class="essentials"><ul>
      <li>21k Miles Shown</li>
      <li>Five-Speed Manual Transaxle</li>
      <li>Guards Red Paint</li>
    </ul></div>
</body></html>"#;

fn finder(listings: Option<Vec<RawListing>>) -> (DealFinder, Arc<RecordingLookup>) {
    let fetcher = Arc::new(FakeFetcher {
        pages: HashMap::from([(
            "https://auctions.test/listing/porsche/".to_string(),
            PORSCHE_PAGE.to_string(),
        )]),
    });
    let lookup = Arc::new(RecordingLookup {
        history: JsonHistoryLookup::new(history()),
        failing_make: "Ferrari",
        calls: Mutex::new(Vec::new()),
    });
    let finder = DealFinder::new(
        Arc::new(FakeScraper { listings }),
        DetailExtractor::new(fetcher),
        lookup.clone(),
    )
    .with_max_in_flight(2)
    .with_ending_within(Duration::hours(24));
    (finder, lookup)
}

#[tokio::test]
async fn finds_and_ranks_deals() {
    let listings = vec![
        active("1991 BMW M3", "bmw", 30_000.0, Duration::hours(20)),
        active("1988 Porsche 911 Carrera Coupe", "porsche", 9_000.0, Duration::hours(18)),
        active("1988 Porsche 911 Targa", "later", 9_000.0, Duration::hours(30)),
        active("1987 Porsche 911 Carrera", "ended", 9_000.0, Duration::hours(-1)),
        active("1972 Zastava 750", "zastava", 1_000.0, Duration::hours(5)),
        active("1988 Ferrari Testarossa", "ferrari", 80_000.0, Duration::hours(3)),
        active("1986 Porsche 944 Turbo", "944", 15_000.0, Duration::hours(2)),
    ];
    let (finder, lookup) = finder(Some(listings));

    let report = finder.find_deals_at(&ListingFilter::default(), now()).await.unwrap();

    assert_eq!(report.generated_at, now());
    assert_eq!(report.candidates_considered, 5);

    let titles: Vec<&str> = report.deals.iter().map(|d| d.listing.title.as_str()).collect();
    assert_eq!(titles, vec!["1988 Porsche 911 Carrera Coupe", "1991 BMW M3"]);

    let porsche = &report.deals[0];
    assert_eq!(porsche.historical.count, 4);
    assert_eq!(porsche.historical.mean, 13_000.0);
    assert_eq!(porsche.deal_score, 10);
    assert!(porsche.ending_soon);
    let details = porsche.listing.details.as_ref().expect("details attached");
    assert_eq!(details.mileage, Some(21_000));
    assert_eq!(details.exterior_color.as_deref(), Some("Guards Red"));

    let bmw = &report.deals[1];
    assert_eq!(bmw.deal_score, 5);
    assert!(bmw.listing.details.is_none(), "failed detail fetch leaves no details");

    let calls = lookup.calls.lock().unwrap();
    assert!(calls.contains(&("Porsche".into(), "911".into(), 1986, 1990)));
    assert!(calls.contains(&("BMW".into(), "M3".into(), 1989, 1993)));
    assert!(!calls.iter().any(|(make, ..)| make == "Zastava"));
}

#[tokio::test]
async fn failed_index_scrape_is_an_error() {
    let (finder, lookup) = finder(None);

    let err = finder.find_deals_at(&ListingFilter::default(), now()).await.unwrap_err();

    assert!(matches!(err, Error::Fetch(FetchError::Timeout { .. })));
    assert!(lookup.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn no_candidates_is_an_empty_success() {
    let (finder, _) = finder(Some(Vec::new()));

    let report = finder.find_deals_at(&ListingFilter::default(), now()).await.unwrap();

    assert_eq!(report.candidates_considered, 0);
    assert!(report.deals.is_empty());
}

#[tokio::test]
async fn report_serializes_camel_case() {
    let listings = vec![active("1988 Porsche 911 Carrera Coupe", "porsche", 9_000.0, Duration::hours(18))];
    let (finder, _) = finder(Some(listings));

    let report = finder.find_deals_at(&ListingFilter::default(), now()).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["candidatesConsidered"], 1);
    assert_eq!(json["deals"][0]["dealScore"], 10);
    assert_eq!(json["deals"][0]["endingSoon"], true);
    assert_eq!(json["deals"][0]["listing"]["status"], "active");
}
