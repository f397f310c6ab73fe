use regex::Regex;
use std::sync::LazyLock;

use crate::normalize::{match_make_prefix, max_year, MIN_YEAR};

static TITLE_MILEAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[\s(])(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)(k)?-mile\b").unwrap()
});

/// Mileage encoded in a listing title, e.g. "4,400-Mile" or "43K-Mile".
pub fn extract_mileage_from_title(title: &str) -> Option<u32> {
    let caps = TITLE_MILEAGE.captures(title)?;
    let value: f64 = caps[1].replace(',', "").parse().ok()?;
    let miles = if caps.get(2).is_some() {
        value * 1000.0
    } else {
        value
    };
    Some(miles.round() as u32)
}

/// What can be read off a title like "4,400-Mile 1988 Ferrari Testarossa".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleParts {
    pub mileage: Option<u32>,
    pub year: Option<i32>,
    pub make: Option<String>,
    pub model: Option<String>,
}

fn title_year(token: &str) -> Option<i32> {
    if token.len() != 4 || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: i32 = token.parse().ok()?;
    (MIN_YEAR..=max_year()).contains(&year).then_some(year)
}

/// Split a listing title into mileage, year, make and the first model token.
pub fn parse_title(title: &str) -> TitleParts {
    let tokens: Vec<&str> = title.split_whitespace().collect();

    let year_at = tokens.iter().position(|t| title_year(t).is_some());
    let year = year_at.and_then(|i| title_year(tokens[i]));
    let search_from = year_at.map_or(0, |i| i + 1);

    let make_at = (search_from..tokens.len())
        .find_map(|i| match_make_prefix(&tokens[i..]).map(|(make, len)| (i, make, len)));

    let (make, model) = match make_at {
        Some((i, make, len)) => {
            let model = tokens
                .get(i + len)
                .map(|t| t.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '(' | ')')))
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            (Some(make.to_string()), model)
        }
        None => (None, None),
    };

    TitleParts {
        mileage: extract_mileage_from_title(title),
        year,
        make,
        model,
    }
}
