use regex::Regex;
use std::sync::LazyLock;

use super::make::{capitalize, normalize_make};

/// Kept lowercase unless they open the model name.
const CONNECTORS: &[&str] = &[
    "and", "of", "de", "del", "della", "di", "da", "von", "van", "la", "le", "the", "for", "with",
];

/// Trim and badge codes written in capitals regardless of make.
const COMMON_UPPER: &[&str] = &[
    "amg", "gt", "gti", "gtr", "gts", "gto", "rs", "ss", "srt", "svt", "sti", "wrx", "tdi", "nsx",
    "crx", "suv", "v6", "v8", "v10", "v12", "ii", "iii", "iv",
];

const PORSCHE_UPPER: &[&str] = &["rsr", "sc", "gt2", "gt3", "gt4", "rs4"];

const FERRARI_UPPER: &[&str] = &[
    "gtb", "gtc", "gtbi", "gtsi", "gtc4", "swb", "lwb", "tdf", "tr", "lm", "mm", "sa", "m",
];

const MERCEDES_UPPER: &[&str] = &[
    "sl", "slk", "slc", "slr", "sls", "se", "sel", "sec", "clk", "cls", "cla", "gl", "gla", "glc",
    "gle", "gls", "ml", "ce", "td", "te",
];

type Rewrite = (Regex, &'static str);

fn rewrites(rules: &[(&str, &'static str)]) -> Vec<Rewrite> {
    rules
        .iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), *replacement))
        .collect()
}

static PORSCHE_REWRITES: LazyLock<Vec<Rewrite>> = LazyLock::new(|| {
    rewrites(&[
        // "GT-3", "gt 3" -> "gt3"
        (r"(?i)\bgt[\s-]?([234])\b", "gt$1"),
        // "911 S", "911 SC" -> "911S", "911SC"
        (r"(?i)\b(356|911|912)\s+(sc|[stel])\b", "$1$2"),
    ])
});

static FERRARI_REWRITES: LazyLock<Vec<Rewrite>> = LazyLock::new(|| {
    rewrites(&[
        // "250GT", "275gtb" -> "250 GT", "275 GTB"
        (r"(?i)\b(\d{3})(gt[a-z]?|gto|tr|tdf|swb|lm|mm)\b", "$1 $2"),
        // The 250 family is always "250 GT <variant>", except the GTO.
        (r"(?i)\b250\s+(swb|lwb|tdf|lusso|california|europa|boano|ellena|pf)\b", "250 GT $1"),
    ])
});

static MERCEDES_REWRITES: LazyLock<Vec<Rewrite>> = LazyLock::new(|| {
    rewrites(&[
        // "300 SL", "280 se" -> "300SL", "280SE"
        (r"(?i)\b(\d{3})\s+(sl|slc|sel|sec|se|ce|td|te|e|d)\b", "$1$2"),
        // "E Class", "gle class" -> "E-Class", "GLE-Class"
        (r"(?i)\b([a-z]{1,3})[\s-]class\b", "$1-Class"),
    ])
});

static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)([a-z]+)$").unwrap());
static ALPHA_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+\d+[a-z0-9]*$").unwrap());

/// Canonical model name, cased with make-specific rules first and generic rules after.
pub fn normalize_model(raw: &str, make: Option<&str>) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return String::new();
    }

    let make = make.map(normalize_make);
    let (rules, upper): (Option<&[Rewrite]>, &[&str]) = match make.as_deref() {
        Some("Porsche") => (Some(PORSCHE_REWRITES.as_slice()), PORSCHE_UPPER),
        Some("Ferrari") => (Some(FERRARI_REWRITES.as_slice()), FERRARI_UPPER),
        Some("Mercedes-Benz") => (Some(MERCEDES_REWRITES.as_slice()), MERCEDES_UPPER),
        _ => (None, &[]),
    };

    let mut text = collapsed;
    for (pattern, replacement) in rules.unwrap_or_default() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }

    text.split_whitespace()
        .enumerate()
        .map(|(i, token)| case_token(token, i == 0, upper))
        .collect::<Vec<_>>()
        .join(" ")
}

fn case_token(token: &str, first: bool, upper: &[&str]) -> String {
    let lower = token.to_lowercase();
    if !first && CONNECTORS.contains(&lower.as_str()) {
        return lower;
    }

    // Case each piece of "Mach-E" or "GTB/4" on its own.
    let mut out = String::with_capacity(token.len());
    let mut rest = token;
    while let Some(idx) = rest.find(['-', '/']) {
        out.push_str(&case_part(&rest[..idx], upper));
        out.push_str(&rest[idx..idx + 1]);
        rest = &rest[idx + 1..];
    }
    out.push_str(&case_part(rest, upper));
    out
}

fn case_part(part: &str, upper: &[&str]) -> String {
    if part.is_empty() {
        return String::new();
    }
    let lower = part.to_lowercase();

    if upper.contains(&lower.as_str()) || COMMON_UPPER.contains(&lower.as_str()) {
        return part.to_uppercase();
    }
    if lower.chars().all(|c| c.is_ascii_digit()) {
        return lower;
    }
    // 911s -> 911S
    if let Some(caps) = NUMERIC_PREFIX.captures(&lower) {
        return format!("{}{}", &caps[1], caps[2].to_uppercase());
    }
    // m3, gt3, e30, f40
    if ALPHA_NUMERIC.is_match(&lower) {
        return part.to_uppercase();
    }
    // Short acronyms already written in capitals stay that way.
    let letters = part.chars().filter(|c| c.is_alphabetic()).count();
    if letters > 1 && part.len() <= 4 && part.chars().all(|c| !c.is_lowercase()) {
        return part.to_string();
    }
    capitalize(part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn porsche_variants() {
        assert_eq!(normalize_model("911s", Some("porsche")), "911S");
        assert_eq!(normalize_model("911 carrera 4s", Some("Porsche")), "911 Carrera 4S");
        assert_eq!(normalize_model("911 gt-3 rs", Some("Porsche")), "911 GT3 RS");
        assert_eq!(normalize_model("911 sc targa", Some("Porsche")), "911SC Targa");
    }

    #[test]
    fn ferrari_variants() {
        assert_eq!(normalize_model("250gt swb", Some("Ferrari")), "250 GT SWB");
        assert_eq!(normalize_model("365 gtb/4 daytona", Some("Ferrari")), "365 GTB/4 Daytona");
        assert_eq!(normalize_model("testarossa", Some("Ferrari")), "Testarossa");
        assert_eq!(normalize_model("f40", Some("Ferrari")), "F40");
        assert_eq!(normalize_model("250 lusso", Some("Ferrari")), "250 GT Lusso");
        assert_eq!(normalize_model("250 GTO", Some("Ferrari")), "250 GTO");
    }

    #[test]
    fn mercedes_patterns() {
        assert_eq!(normalize_model("300 sl gullwing", Some("mercedes")), "300SL Gullwing");
        assert_eq!(normalize_model("e class", Some("Mercedes-Benz")), "E-Class");
        assert_eq!(normalize_model("gle-class", Some("Mercedes-Benz")), "GLE-Class");
        assert_eq!(normalize_model("sl500", Some("Mercedes-Benz")), "SL500");
    }

    #[test]
    fn generic_casing_keeps_connectors_lowercase() {
        assert_eq!(normalize_model("spirit of ecstasy", None), "Spirit of Ecstasy");
        assert_eq!(normalize_model("de ville", None), "De Ville");
        assert_eq!(normalize_model("golf GTI", None), "Golf GTI");
        assert_eq!(normalize_model("mustang mach-e", None), "Mustang Mach-E");
    }

    #[test]
    fn normalized_models_are_stable() {
        for (raw, make) in [
            ("911 carrera 4s", "Porsche"),
            ("250gt swb", "Ferrari"),
            ("300 sl", "Mercedes-Benz"),
            ("e class", "Mercedes-Benz"),
            ("m3 competition", "BMW"),
        ] {
            let once = normalize_model(raw, Some(make));
            assert_eq!(normalize_model(&once, Some(make)), once);
        }
    }
}
