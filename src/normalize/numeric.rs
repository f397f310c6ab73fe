use chrono::{Datelike, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::models::RawValue;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_MILEAGE: u32 = 1_000_000;
const NM_TO_LB_FT: f64 = 0.7376;
const CUBIC_INCHES_PER_LITER: f64 = 61.024;
/// Bare displacement numbers above this are read as cc.
const BARE_CC_THRESHOLD: f64 = 10.0;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?|-?\.\d+").unwrap());
static YEAR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").unwrap());
static THOUSANDS_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s*k\b").unwrap());
static DISPLACEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)((?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?)\s*-?\s*(cc|cm3|cid|ci|cu\.?\s*in\.?|cubic[\s-]inch(?:es)?|l|liters?|litres?)\b",
    )
    .unwrap()
});
static TORQUE_READING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)((?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?)\s*-?\s*(nm\b|n·m|n-m\b|newton|lb\.?[\s-]?ft\b|lbs?[\s-]?ft\b|ft\.?[\s-]?lbs?\b|pound[\s-]feet\b)",
    )
    .unwrap()
});

/// First number in free text, thousands separators removed.
pub(crate) fn first_number(text: &str) -> Option<f64> {
    let found = NUMBER.find(text)?;
    found.as_str().replace(',', "").parse().ok()
}

fn raw_number(raw: &RawValue) -> Option<f64> {
    match raw {
        RawValue::Number(n) if n.is_finite() => Some(*n),
        RawValue::Number(_) => None,
        RawValue::Text(s) => first_number(s),
    }
}

/// Latest accepted model year: next year's models go on sale this year.
pub fn max_year() -> i32 {
    Utc::now().year() + 1
}

pub fn normalize_year(raw: &RawValue) -> Option<i32> {
    let year = match raw {
        RawValue::Number(n) if n.is_finite() && n.fract() == 0.0 => *n as i64,
        RawValue::Number(_) => return None,
        RawValue::Text(s) => match s.trim().parse::<i64>() {
            Ok(n) => n,
            Err(_) => YEAR_TOKEN.captures(s)?[1].parse().ok()?,
        },
    };
    (i64::from(MIN_YEAR)..=i64::from(max_year()))
        .contains(&year)
        .then_some(year as i32)
}

/// Miles, accepting "43k" shorthand. Out of range is `None`, never clamped.
///
/// Only the leading figure counts; a `k` multiplies it only when it follows
/// that figure directly.
pub fn normalize_mileage(raw: &RawValue) -> Option<u32> {
    let miles = match raw {
        RawValue::Text(s) => {
            let found = NUMBER.find(s)?;
            let value: f64 = found.as_str().replace(',', "").parse().ok()?;
            if THOUSANDS_SUFFIX.is_match(&s[found.end()..]) {
                value * 1000.0
            } else {
                value
            }
        }
        other => raw_number(other)?,
    };
    let miles = miles.round();
    (miles >= 0.0 && miles < f64::from(MAX_MILEAGE)).then_some(miles as u32)
}

/// Non-negative price rounded to cents.
pub fn normalize_price(raw: &RawValue) -> Option<f64> {
    let price = raw_number(raw)?;
    (price >= 0.0).then(|| (price * 100.0).round() / 100.0)
}

fn in_power_range(value: f64) -> Option<u32> {
    let value = value.round();
    (value > 0.0 && value < 2000.0).then_some(value as u32)
}

pub fn normalize_horsepower(raw: &RawValue) -> Option<u32> {
    in_power_range(raw_number(raw)?)
}

/// Torque in lb-ft. The unit is the one written right after a figure; a
/// figure given in lb-ft wins over one given in Nm, and Nm figures are
/// converted. Without any unit the first number is taken as lb-ft.
pub fn normalize_torque(raw: &RawValue) -> Option<u32> {
    let RawValue::Text(s) = raw else {
        return in_power_range(raw_number(raw)?);
    };

    let mut newton_meters = None;
    for caps in TORQUE_READING.captures_iter(s) {
        let Ok(value) = caps[1].replace(',', "").parse::<f64>() else {
            continue;
        };
        let unit = caps[2].to_lowercase();
        if unit.starts_with('n') {
            newton_meters.get_or_insert(value);
        } else {
            return in_power_range(value);
        }
    }

    let lb_ft = match newton_meters {
        Some(nm) => nm * NM_TO_LB_FT,
        None => first_number(s)?,
    };
    in_power_range(lb_ft)
}

/// Displacement in liters, rounded to one decimal.
///
/// Explicit units win. A bare number above 10 is taken as cc and anything
/// else as liters, so a bare "12" reads as 0.012 L rather than a 12-liter engine.
pub fn normalize_engine_size(raw: &RawValue) -> Option<f64> {
    let liters = match raw {
        RawValue::Text(s) => match DISPLACEMENT.captures(s) {
            Some(caps) => {
                let value: f64 = caps[1].replace(',', "").parse().ok()?;
                let unit = caps[2].to_lowercase();
                if unit.starts_with("cc") || unit == "cm3" {
                    value / 1000.0
                } else if unit.starts_with('c') {
                    value / CUBIC_INCHES_PER_LITER
                } else {
                    value
                }
            }
            None => bare_displacement(first_number(s)?),
        },
        other => bare_displacement(raw_number(other)?),
    };
    let liters = (liters * 10.0).round() / 10.0;
    (liters > 0.0).then_some(liters)
}

fn bare_displacement(value: f64) -> f64 {
    if value > BARE_CC_THRESHOLD {
        value / 1000.0
    } else {
        value
    }
}

/// Uppercase VIN with whitespace removed; at most 17 characters.
pub fn normalize_vin(raw: &str) -> Option<String> {
    let vin: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();
    (!vin.is_empty() && vin.chars().count() <= 17).then_some(vin)
}
