use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Source;

/// Auction state as reported by the source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ListingStatus {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "sold")]
    Sold,
    #[serde(rename = "not sold", alias = "not_sold")]
    NotSold,
}

/// A JSON value that may arrive as a number or as free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<u32> for RawValue {
    fn from(value: u32) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// Gearbox family as read from a listing page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GearboxKind {
    Manual,
    Automatic,
}

/// Secondary attributes read from a listing's own page. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidders: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watchers: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<GearboxKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exterior_color: Option<String>,
}

impl ListingDetail {
    pub fn is_empty(&self) -> bool {
        *self == ListingDetail::default()
    }
}

/// A listing as scraped, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub title: String,
    pub url: String,
    pub status: ListingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_bid: Option<f64>,
    #[serde(rename = "endDate", alias = "end_date", default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ListingDetail>,
}

impl RawListing {
    pub fn new(title: impl Into<String>, url: impl Into<String>, status: ListingStatus) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            status,
            source: None,
            make: None,
            model: None,
            year: None,
            sold_price: None,
            price: None,
            bid_amount: None,
            current_bid: None,
            end_date: None,
            sold_date: None,
            images: Vec::new(),
            details: None,
        }
    }

    /// Auction end time, if the source provided a parseable one.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        match self.end_date.as_ref()? {
            RawValue::Number(n) => timestamp_to_datetime(*n),
            RawValue::Text(s) => parse_date(s),
        }
    }

    /// Sale date, falling back to the auction end time.
    pub fn sold_time(&self) -> Option<DateTime<Utc>> {
        self.sold_date
            .as_deref()
            .and_then(parse_date)
            .or_else(|| self.end_time())
    }

    /// Current high bid: the numeric field first, then the formatted `bid_amount`.
    pub fn current_bid_amount(&self) -> Option<f64> {
        self.current_bid
            .or_else(|| self.bid_amount.as_deref().and_then(parse_currency))
    }

    /// Sale price from `sold_price` text, falling back to the numeric `price`.
    pub fn resolved_sold_price(&self) -> Option<f64> {
        self.sold_price
            .as_deref()
            .and_then(parse_currency)
            .or(self.price)
    }
}

/// "$12,500" -> 12500.0. Keeps digits and the decimal point only.
pub(crate) fn parse_currency(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().ok()
}

fn timestamp_to_datetime(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    // Millisecond timestamps are 13 digits for any date after 1973.
    if value >= 1e11 {
        DateTime::from_timestamp_millis(value as i64)
    } else {
        DateTime::from_timestamp(value as i64, 0)
    }
}

/// Parse the date formats auction sites emit: RFC 3339, ISO dates with or
/// without a time, US `m/d/y`, long-form `October 17, 2025`, and epoch numbers.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    text.parse::<f64>().ok().and_then(timestamp_to_datetime)
}
