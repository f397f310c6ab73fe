use std::collections::HashMap;
use std::sync::LazyLock;

/// Lower-cased spellings seen in the wild, mapped to the canonical make.
/// Canonical names are listed too so normalized output maps to itself.
const MAKE_ALIASES: &[(&str, &str)] = &[
    ("acura", "Acura"),
    ("alfa", "Alfa Romeo"),
    ("alfa romeo", "Alfa Romeo"),
    ("alfa-romeo", "Alfa Romeo"),
    ("alpina", "Alpina"),
    ("amc", "AMC"),
    ("aston", "Aston Martin"),
    ("aston martin", "Aston Martin"),
    ("aston-martin", "Aston Martin"),
    ("audi", "Audi"),
    ("austin healey", "Austin-Healey"),
    ("austin-healey", "Austin-Healey"),
    ("bentley", "Bentley"),
    ("benz", "Mercedes-Benz"),
    ("bmw", "BMW"),
    ("bugatti", "Bugatti"),
    ("buick", "Buick"),
    ("cadillac", "Cadillac"),
    ("chevrolet", "Chevrolet"),
    ("chevy", "Chevrolet"),
    ("chrysler", "Chrysler"),
    ("datsun", "Datsun"),
    ("de tomaso", "De Tomaso"),
    ("detomaso", "De Tomaso"),
    ("dodge", "Dodge"),
    ("ferrari", "Ferrari"),
    ("fiat", "Fiat"),
    ("ford", "Ford"),
    ("genesis", "Genesis"),
    ("gmc", "GMC"),
    ("honda", "Honda"),
    ("hummer", "Hummer"),
    ("hyundai", "Hyundai"),
    ("infiniti", "Infiniti"),
    ("international", "International Harvester"),
    ("international harvester", "International Harvester"),
    ("jaguar", "Jaguar"),
    ("jeep", "Jeep"),
    ("kia", "Kia"),
    ("lamborghini", "Lamborghini"),
    ("lambo", "Lamborghini"),
    ("lancia", "Lancia"),
    ("land rover", "Land Rover"),
    ("land-rover", "Land Rover"),
    ("landrover", "Land Rover"),
    ("lexus", "Lexus"),
    ("lincoln", "Lincoln"),
    ("lotus", "Lotus"),
    ("maserati", "Maserati"),
    ("mazda", "Mazda"),
    ("mclaren", "McLaren"),
    ("mercedes", "Mercedes-Benz"),
    ("mercedes benz", "Mercedes-Benz"),
    ("mercedes-amg", "Mercedes-Benz"),
    ("mercedes-benz", "Mercedes-Benz"),
    ("mini", "MINI"),
    ("mitsubishi", "Mitsubishi"),
    ("morgan", "Morgan"),
    ("nissan", "Nissan"),
    ("oldsmobile", "Oldsmobile"),
    ("plymouth", "Plymouth"),
    ("polestar", "Polestar"),
    ("pontiac", "Pontiac"),
    ("porsche", "Porsche"),
    ("ram", "Ram"),
    ("rivian", "Rivian"),
    ("rolls royce", "Rolls-Royce"),
    ("rolls-royce", "Rolls-Royce"),
    ("saab", "Saab"),
    ("shelby", "Shelby"),
    ("subaru", "Subaru"),
    ("suzuki", "Suzuki"),
    ("tesla", "Tesla"),
    ("toyota", "Toyota"),
    ("triumph", "Triumph"),
    ("volkswagen", "Volkswagen"),
    ("volvo", "Volvo"),
    ("vw", "Volkswagen"),
];

static ALIASES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| MAKE_ALIASES.iter().copied().collect());

/// Longest alias, in words.
const MAX_ALIAS_WORDS: usize = 3;

fn alias_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Canonical make for a known alias.
pub fn lookup_make(raw: &str) -> Option<&'static str> {
    ALIASES.get(alias_key(raw).as_str()).copied()
}

/// Canonical make name. Unknown makes are title-cased, never rejected.
pub fn normalize_make(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match lookup_make(trimmed) {
        Some(make) => make.to_string(),
        None => title_case(trimmed),
    }
}

/// Longest known make at the start of `words`, with the number of words it used.
pub fn match_make_prefix(words: &[&str]) -> Option<(&'static str, usize)> {
    (1..=MAX_ALIAS_WORDS.min(words.len()))
        .rev()
        .find_map(|n| lookup_make(&words[..n].join(" ")).map(|make| (make, n)))
}

/// Upper-case the first letter of each word and lower-case the rest.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
