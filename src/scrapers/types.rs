use serde::{Deserialize, Serialize};

use crate::extract::parse_title;
use crate::models::{ListingStatus, RawListing};
use crate::normalize::{normalize_make, normalize_model, normalize_year};

/// Search parameters for listing scraping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingFilter {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    /// `Active` selects running auctions; anything else selects completed ones
    pub status: ListingStatus,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            make: None,
            model: None,
            year_min: None,
            year_max: None,
            status: ListingStatus::Active,
        }
    }
}

impl ListingFilter {
    /// Completed auctions of one make/model within a year range.
    pub fn completed(make: &str, model: &str, year_min: i32, year_max: i32) -> Self {
        Self {
            make: Some(make.to_string()),
            model: Some(model.to_string()),
            year_min: Some(year_min),
            year_max: Some(year_max),
            status: ListingStatus::Sold,
        }
    }

    pub fn wants_completed(&self) -> bool {
        self.status != ListingStatus::Active
    }

    /// Free-text query for sources with a search box.
    pub fn search_query(&self) -> Option<String> {
        let terms: Vec<&str> = [self.make.as_deref(), self.model.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        (!terms.is_empty()).then(|| terms.join(" "))
    }

    /// Post-fetch check for sources that cannot filter server-side.
    pub fn matches(&self, listing: &RawListing) -> bool {
        let status_ok = match self.status {
            ListingStatus::Active => listing.status == ListingStatus::Active,
            _ => listing.status != ListingStatus::Active,
        };
        if !status_ok {
            return false;
        }

        let identity = VehicleIdentity::of(listing);

        if let Some(make) = self.make.as_deref() {
            if identity.make.as_deref() != Some(normalize_make(make).as_str()) {
                return false;
            }
        }
        if let Some(model) = self.model.as_deref() {
            let wanted = normalize_model(model, self.make.as_deref());
            if !identity.model.as_deref().is_some_and(|m| model_matches(m, &wanted)) {
                return false;
            }
        }
        if self.year_min.is_some() || self.year_max.is_some() {
            let Some(year) = identity.year else {
                return false;
            };
            if self.year_min.is_some_and(|min| year < min) || self.year_max.is_some_and(|max| year > max) {
                return false;
            }
        }
        true
    }
}

/// Same model, or a longer model name that starts with it word for word
/// ("911 Carrera" matches "911").
fn model_matches(candidate: &str, wanted: &str) -> bool {
    candidate.eq_ignore_ascii_case(wanted)
        || candidate
            .to_lowercase()
            .starts_with(&format!("{} ", wanted.to_lowercase()))
}

/// Normalized make, model and year of a listing, read from its fields
/// first and its title second.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleIdentity {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
}

impl VehicleIdentity {
    pub fn of(listing: &RawListing) -> Self {
        let title = parse_title(&listing.title);

        let make = non_blank(listing.make.as_deref())
            .or(title.make)
            .map(|m| normalize_make(&m));
        let model = non_blank(listing.model.as_deref())
            .or(title.model)
            .map(|m| normalize_model(&m, make.as_deref()));
        let year = listing
            .year
            .as_ref()
            .and_then(normalize_year)
            .or(title.year);

        Self { make, model, year }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawValue;

    fn listing(title: &str, status: ListingStatus) -> RawListing {
        RawListing::new(title, "https://example.com/listing", status)
    }

    #[test]
    fn identity_prefers_fields_over_title() {
        let mut l = listing("1988 Ferrari Testarossa", ListingStatus::Active);
        assert_eq!(
            VehicleIdentity::of(&l),
            VehicleIdentity {
                make: Some("Ferrari".into()),
                model: Some("Testarossa".into()),
                year: Some(1988),
            }
        );

        l.make = Some("porsche".into());
        l.model = Some("911 carrera".into());
        l.year = Some(RawValue::Number(1987.0));
        let id = VehicleIdentity::of(&l);
        assert_eq!(id.make.as_deref(), Some("Porsche"));
        assert_eq!(id.model.as_deref(), Some("911 Carrera"));
        assert_eq!(id.year, Some(1987));
    }

    #[test]
    fn filter_matches_make_model_and_years() {
        let filter = ListingFilter::completed("porsche", "911", 1985, 1989);
        assert!(filter.matches(&listing("1987 Porsche 911 Carrera", ListingStatus::Sold)));
        assert!(filter.matches(&listing("1989 Porsche 911 Speedster", ListingStatus::NotSold)));
        assert!(!filter.matches(&listing("1984 Porsche 911 Carrera", ListingStatus::Sold)));
        assert!(!filter.matches(&listing("1987 Porsche 944 Turbo", ListingStatus::Sold)));
        assert!(!filter.matches(&listing("1987 Porsche 911 Carrera", ListingStatus::Active)));
    }

    #[test]
    fn empty_filter_only_checks_status() {
        let filter = ListingFilter::default();
        assert!(filter.matches(&listing("Mystery barn find", ListingStatus::Active)));
        assert!(!filter.matches(&listing("Mystery barn find", ListingStatus::Sold)));
    }

    #[test]
    fn search_query_joins_terms() {
        let filter = ListingFilter::completed("Ferrari", "Testarossa", 1986, 1990);
        assert_eq!(filter.search_query().as_deref(), Some("Ferrari Testarossa"));
        assert_eq!(ListingFilter::default().search_query(), None);
    }
}
