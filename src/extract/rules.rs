//! Ordered, named extraction rules. Each field has a chain that is tried
//! front to back until one rule yields a value.

use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;
use tracing::debug;

use super::page::{element_text, next_element_sibling, ListingPage};
use crate::models::GearboxKind;

/// A pure extraction step.
pub struct Rule<T> {
    pub name: &'static str,
    pub apply: fn(&ListingPage) -> Option<T>,
}

/// Run `rules` in order and return the first value produced.
pub fn first_match<T>(rules: &[Rule<T>], page: &ListingPage) -> Option<T> {
    rules.iter().find_map(|rule| {
        let value = (rule.apply)(page);
        if value.is_some() {
            debug!(rule = rule.name, "extraction rule matched");
        }
        value
    })
}

pub const MILEAGE_RULES: &[Rule<u32>] = &[
    Rule { name: "essentials_mileage", apply: essentials_mileage },
    Rule { name: "page_qualified_mileage", apply: page_qualified_mileage },
    Rule { name: "page_mileage", apply: page_mileage },
];

pub const TRANSMISSION_RULES: &[Rule<GearboxKind>] = &[
    Rule { name: "essentials_transmission", apply: essentials_transmission },
    Rule { name: "page_transmission", apply: page_transmission },
    Rule { name: "page_text_transmission", apply: page_text_transmission },
];

pub const COLOR_RULES: &[Rule<String>] = &[
    Rule { name: "essentials_paint_color", apply: essentials_paint_color },
    Rule { name: "page_paint_color", apply: page_paint_color },
    Rule { name: "finished_in_sentence", apply: finished_in_sentence },
];

pub const BIDDER_RULES: &[Rule<u32>] = &[
    Rule { name: "bids_table_cell", apply: bids_table_cell },
    Rule { name: "bids_value_class", apply: bids_value_class },
];

pub const WATCHER_RULES: &[Rule<u32>] = &[
    Rule { name: "watchers_stat", apply: watchers_stat },
    Rule { name: "watchers_label", apply: watchers_label },
];

pub const COMMENT_RULES: &[Rule<u32>] = &[
    Rule { name: "comments_heading", apply: comments_heading },
    Rule { name: "comments_info_pair", apply: comments_info_pair },
];

mod patterns {
    use super::*;

    fn re(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    pub static ITEM_MILEAGE: LazyLock<Regex> = LazyLock::new(|| {
        re(r"(?i)\b(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)\s*(k)?\s*miles?\b")
    });

    pub static QUALIFIED_MILEAGE: LazyLock<Regex> = LazyLock::new(|| {
        re(r"(?i)\b(?:indicated|documented|odometer(?:\s+reads)?|reads|showing|shows|approximately)\s+(?:just\s+)?(?:over\s+|under\s+)?(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)\s*(k)?\s*miles?\b")
    });

    pub static AUTOMATIC_TERMS: LazyLock<Regex> = LazyLock::new(|| {
        re(r"(?i)\bdual[- ]clutch\b|\bpdk\b|\bdct\b|\bautomatic\b|\bautomated\b|\bsequential\b")
    });

    pub static MANUAL_TERM: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)\bmanual\b"));

    pub static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| re(r"[.!?](?:\s+|$)"));

    pub static INTERIOR_TERMS: LazyLock<Regex> =
        LazyLock::new(|| re(r"(?i)interior|upholster|leather|cabin|\bseat"));

    pub static PAINT_MENTION: LazyLock<Regex> = LazyLock::new(|| {
        re(r"(?i)\bpaint|\bcolou?r\b|\bmetallic\b|\bexterior\b|\b(?:black|white|silver|gr[ae]y|red|blue|green|yellow|orange|brown|beige|gold|purple|maroon|burgundy)\b")
    });

    pub static PAINT_EXPLICIT: LazyLock<Regex> =
        LazyLock::new(|| re(r"(?i)\bpaint\b|\bfinish\b|\bexterior colou?r\b"));

    pub static FINISHED_IN: LazyLock<Regex> = LazyLock::new(|| {
        re(r"(?i)\b(?:re)?(?:finished|painted)\s+in\s+([A-Za-z][A-Za-z' -]{0,40}?)(?:\s+(?:over|with|and|by|during|paint|in|from)\b|[.,;()]|$)")
    });

    pub static LABEL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
        re(r"(?i)^(?:exterior\s+colou?r|exterior|paint\s+colou?r|colou?r)\s*[:\-]\s*")
    });

    pub static PAINT_SUFFIX: LazyLock<Regex> =
        LazyLock::new(|| re(r"(?i)\s+(?:paint(?:work)?|finish)$"));

    pub static COUNT: LazyLock<Regex> = LazyLock::new(|| re(r"\d[\d,]*"));

    pub static WATCHERS_TEXT: LazyLock<Regex> =
        LazyLock::new(|| re(r"(?i)^(\d[\d,]*)\s+watch(?:ers?|ing)$"));

    pub static COMMENTS_TEXT: LazyLock<Regex> =
        LazyLock::new(|| re(r"(?i)^(\d[\d,]*)\s+comments?\b"));
}

mod selectors {
    use super::*;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    pub static TABLE_CELL: LazyLock<Selector> = LazyLock::new(|| sel("td, th"));
    pub static BIDS_VALUE: LazyLock<Selector> =
        LazyLock::new(|| sel(".number-bids-value, .listing-stats-value.bids"));
    pub static WATCHERS_STAT: LazyLock<Selector> = LazyLock::new(|| {
        sel("[data-stats-item='watchers'], .listing-watchers, .watchers-count, li.watching .value")
    });
    pub static STAT_TEXT: LazyLock<Selector> = LazyLock::new(|| sel("span, li, strong"));
    pub static HEADING: LazyLock<Selector> = LazyLock::new(|| sel("h1, h2, h3, h4"));
    pub static INFO_LABEL: LazyLock<Selector> =
        LazyLock::new(|| sel("dt, .info-label, .stat-label"));
}

/// "1,234" -> 1234
pub(crate) fn parse_count(text: &str) -> Option<u32> {
    let found = patterns::COUNT.find(text)?;
    found.as_str().replace(',', "").parse().ok()
}

/// Number plus optional `k` suffix from a mileage capture.
fn miles_from(number: &str, thousands: bool) -> Option<u32> {
    let value: f64 = number.replace(',', "").parse().ok()?;
    let value = if thousands { value * 1000.0 } else { value };
    let value = value.round();
    (value >= 0.0 && value < f64::from(u32::MAX)).then_some(value as u32)
}

fn mileage_in(pattern: &Regex, text: &str) -> Option<u32> {
    let caps = pattern.captures(text)?;
    miles_from(&caps[1], caps.get(2).is_some())
}

fn essentials_mileage(page: &ListingPage) -> Option<u32> {
    page.essential_items()
        .iter()
        .find_map(|item| mileage_in(&patterns::ITEM_MILEAGE, item))
}

fn page_qualified_mileage(page: &ListingPage) -> Option<u32> {
    mileage_in(&patterns::QUALIFIED_MILEAGE, page.text())
}

fn page_mileage(page: &ListingPage) -> Option<u32> {
    mileage_in(&patterns::ITEM_MILEAGE, page.text())
}

/// Gearbox of the first item naming one. Automatic terms beat "manual"
/// within the same item ("automated manual", "PDK replaced the manual").
fn gearbox_in<'a>(items: impl IntoIterator<Item = &'a str>) -> Option<GearboxKind> {
    items.into_iter().find_map(|item| {
        if patterns::AUTOMATIC_TERMS.is_match(item) {
            Some(GearboxKind::Automatic)
        } else if patterns::MANUAL_TERM.is_match(item) {
            Some(GearboxKind::Manual)
        } else {
            None
        }
    })
}

fn essentials_transmission(page: &ListingPage) -> Option<GearboxKind> {
    gearbox_in(page.essential_items().iter().map(String::as_str))
}

fn page_transmission(page: &ListingPage) -> Option<GearboxKind> {
    gearbox_in(page.items().iter().map(String::as_str))
}

/// Body prose, one sentence at a time.
fn page_text_transmission(page: &ListingPage) -> Option<GearboxKind> {
    gearbox_in(patterns::SENTENCE_END.split(page.text()))
}

/// Paint description from list items. Interior mentions are excluded and
/// items naming the paint explicitly win over generic color mentions.
fn paint_color_in(items: &[String]) -> Option<String> {
    let candidates: Vec<&String> = items
        .iter()
        .filter(|item| patterns::PAINT_MENTION.is_match(item))
        .filter(|item| !patterns::INTERIOR_TERMS.is_match(item))
        .collect();

    let chosen = candidates
        .iter()
        .find(|item| patterns::PAINT_EXPLICIT.is_match(item))
        .or_else(|| candidates.first())?;

    clean_color(chosen)
}

fn clean_color(item: &str) -> Option<String> {
    if let Some(caps) = patterns::FINISHED_IN.captures(item) {
        return non_empty(caps[1].trim());
    }
    let without_label = patterns::LABEL_PREFIX.replace(item.trim(), "");
    let cleaned = patterns::PAINT_SUFFIX.replace(without_label.trim(), "");
    non_empty(cleaned.trim())
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

fn essentials_paint_color(page: &ListingPage) -> Option<String> {
    paint_color_in(page.essential_items())
}

fn page_paint_color(page: &ListingPage) -> Option<String> {
    paint_color_in(page.items())
}

fn finished_in_sentence(page: &ListingPage) -> Option<String> {
    let caps = patterns::FINISHED_IN.captures(page.text())?;
    non_empty(caps[1].trim())
}

/// Count in the element that follows a label element reading `label`.
fn labeled_count(page: &ListingPage, label_selector: &Selector, label: &str) -> Option<u32> {
    page.document()
        .select(label_selector)
        .filter(|el| element_text(*el).trim_end_matches(':').eq_ignore_ascii_case(label))
        .find_map(|el| next_element_sibling(el).and_then(|value| parse_count(&element_text(value))))
}

fn bids_table_cell(page: &ListingPage) -> Option<u32> {
    labeled_count(page, &selectors::TABLE_CELL, "bids")
}

fn bids_value_class(page: &ListingPage) -> Option<u32> {
    page.document()
        .select(&selectors::BIDS_VALUE)
        .find_map(|el| parse_count(&element_text(el)))
}

fn watchers_stat(page: &ListingPage) -> Option<u32> {
    page.document()
        .select(&selectors::WATCHERS_STAT)
        .find_map(|el| parse_count(&element_text(el)))
}

fn watchers_label(page: &ListingPage) -> Option<u32> {
    page.document().select(&selectors::STAT_TEXT).find_map(|el| {
        let text = element_text(el);
        let caps = patterns::WATCHERS_TEXT.captures(&text)?;
        parse_count(&caps[1])
    })
}

fn comments_heading(page: &ListingPage) -> Option<u32> {
    page.document().select(&selectors::HEADING).find_map(|el| {
        let text = element_text(el);
        let caps = patterns::COMMENTS_TEXT.captures(&text)?;
        parse_count(&caps[1])
    })
}

fn comments_info_pair(page: &ListingPage) -> Option<u32> {
    labeled_count(page, &selectors::INFO_LABEL, "comments")
}
