use regex::Regex;
use std::sync::LazyLock;

use crate::models::{Condition, Drivetrain, FuelType, Transmission};

pub const UNKNOWN_COLOR: &str = "Unknown";

/// Ordered (pattern, value) table; the first matching pattern wins.
struct Vocabulary<T: Copy> {
    entries: Vec<(Regex, T)>,
}

impl<T: Copy> Vocabulary<T> {
    fn new(table: &[(&str, T)]) -> Self {
        let entries = table
            .iter()
            .map(|(pattern, value)| (Regex::new(&format!("(?i){pattern}")).unwrap(), *value))
            .collect();
        Self { entries }
    }

    fn lookup(&self, text: &str) -> Option<T> {
        self.entries
            .iter()
            .find(|(pattern, _)| pattern.is_match(text))
            .map(|(_, value)| *value)
    }
}

static CONDITIONS: LazyLock<Vocabulary<Condition>> = LazyLock::new(|| {
    Vocabulary::new(&[
        (r"\bconcours\b|\bshow (?:car|quality)\b|\bmuseum\b", Condition::Concours),
        (r"\bexcellent\b|\bpristine\b|\bmint\b|\bimmaculate\b|\blike new\b", Condition::Excellent),
        (r"\bvery good\b|\babove average\b", Condition::VeryGood),
        (r"\bproject\b|\bparts car\b|\bnon[- ]?running\b|\bnot running\b|\bbarn find\b", Condition::Project),
        (r"\bpoor\b|\brough\b|\bneeds work\b", Condition::Poor),
        (r"\bfair\b|\baverage\b|\bdriver\b", Condition::Fair),
        (r"\bgood\b|\bclean\b", Condition::Good),
    ])
});

static DRIVETRAINS: LazyLock<Vocabulary<Drivetrain>> = LazyLock::new(|| {
    Vocabulary::new(&[
        (r"\bawd\b|\ball[- ]wheel\b|\bquattro\b|\b4matic\b|\bxdrive\b|\b4motion\b", Drivetrain::Awd),
        (r"\b4wd\b|\b4x4\b|\bfour[- ]wheel\b", Drivetrain::FourWd),
        (r"\brwd\b|\brear[- ]wheel\b|\brear[- ]drive\b", Drivetrain::Rwd),
        (r"\bfwd\b|\bfront[- ]wheel\b|\bfront[- ]drive\b", Drivetrain::Fwd),
    ])
});

static FUEL_TYPES: LazyLock<Vocabulary<FuelType>> = LazyLock::new(|| {
    Vocabulary::new(&[
        (r"\bplug[- ]?in\b|\bphev\b", FuelType::PlugInHybrid),
        (r"\bhybrid\b|\bhev\b", FuelType::Hybrid),
        (r"\belectric\b|\bev\b|\bbev\b|\bbattery\b", FuelType::Electric),
        (r"\bdiesel\b|\btdi\b|\bturbodiesel\b", FuelType::Diesel),
        (r"\bflex\b|\be85\b", FuelType::FlexFuel),
        (r"\bhydrogen\b|\bfuel cell\b", FuelType::Hydrogen),
        (r"\bnatural gas\b|\bcng\b", FuelType::NaturalGas),
        (r"\bpropane\b|\blpg\b", FuelType::Propane),
        (r"\bgasoline\b|\bgas\b|\bpetrol\b|\bunleaded\b", FuelType::Gasoline),
    ])
});

#[derive(Clone, Copy)]
enum Gearbox {
    Fixed(Transmission),
    CountedManual,
}

static TRANSMISSIONS: LazyLock<Vocabulary<Gearbox>> = LazyLock::new(|| {
    Vocabulary::new(&[
        (r"\bcvt\b|\bcontinuously variable\b", Gearbox::Fixed(Transmission::Cvt)),
        (r"\bsequential\b", Gearbox::Fixed(Transmission::Sequential)),
        (
            r"\bsemi[- ]?auto(?:matic)?\b|\bdual[- ]clutch\b|\bdct\b|\bpdk\b|\bsmg\b|\bdsg\b|\bautomated manual\b|\bf1\b",
            Gearbox::Fixed(Transmission::SemiAutomatic),
        ),
        (
            r"\bautomatic\b|\bauto\b|\btiptronic\b|\bsteptronic\b|\bpowerglide\b|\bhydra-?matic\b",
            Gearbox::Fixed(Transmission::Automatic),
        ),
        (r"\b(?:\d{1,2}|three|four|five|six|seven|eight)[- ]speed\b", Gearbox::CountedManual),
        (r"\bmanual\b|\bstick(?:[- ]shift)?\b", Gearbox::Fixed(Transmission::Manual)),
    ])
});

static GEAR_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}|three|four|five|six|seven|eight)[- ]speed\b").unwrap()
});

static COLORS: LazyLock<Vocabulary<&'static str>> = LazyLock::new(|| {
    Vocabulary::new(&[
        (r"\bburgundy\b|\bmaroon\b|\boxblood\b|\bwine\b|\bbordeaux\b", "Burgundy"),
        (r"\bsilver\b|\bplatinum\b|\bquicksilver\b|\bargento\b", "Silver"),
        (r"\bgr[ae]y\b|\bgraphite\b|\bgunmetal\b|\bcharcoal\b|\bslate\b|\bgrigio\b|\banthracite\b", "Gray"),
        (r"\bblack\b|\bebony\b|\bonyx\b|\bobsidian\b|\bnero\b", "Black"),
        (r"\bwhite\b|\bivory\b|\balabaster\b|\bbianco\b|\bchalk\b|\bpearl\b", "White"),
        (r"\bred\b|\brosso\b|\bscarlet\b|\bcrimson\b|\bruby\b|\bcarmine\b", "Red"),
        (r"\bblue\b|\bnavy\b|\bazure\b|\bcobalt\b|\bblu\b|\bsapphire\b|\bindigo\b", "Blue"),
        (r"\bgreen\b|\bverde\b|\bolive\b|\bemerald\b|\bjade\b|\bteal\b", "Green"),
        (r"\byellow\b|\bgiallo\b|\bcanary\b", "Yellow"),
        (r"\borange\b|\barancio\b|\btangerine\b", "Orange"),
        (r"\bgold\b|\bchampagne\b", "Gold"),
        (r"\bbrown\b|\bbronze\b|\bmocha\b|\bchocolate\b|\bcopper\b", "Brown"),
        (r"\bbeige\b|\btan\b|\bsand\b|\bcream\b|\bbiscuit\b", "Beige"),
        (r"\bpurple\b|\bviolet\b|\bplum\b|\baubergine\b", "Purple"),
    ])
});

pub fn normalize_condition(raw: &str) -> Condition {
    CONDITIONS.lookup(raw).unwrap_or(Condition::Unknown)
}

pub fn normalize_drivetrain(raw: &str) -> Drivetrain {
    DRIVETRAINS.lookup(raw).unwrap_or(Drivetrain::Unknown)
}

pub fn normalize_fuel_type(raw: &str) -> FuelType {
    FUEL_TYPES.lookup(raw).unwrap_or(FuelType::Unknown)
}

pub fn normalize_transmission(raw: &str) -> Transmission {
    match TRANSMISSIONS.lookup(raw) {
        Some(Gearbox::Fixed(t)) => t,
        Some(Gearbox::CountedManual) => GEAR_COUNT
            .captures(raw)
            .and_then(|caps| gear_count(&caps[1]))
            .map_or(Transmission::Manual, Transmission::SpeedManual),
        None => Transmission::Unknown,
    }
}

fn gear_count(word: &str) -> Option<u8> {
    let n = match word.to_lowercase().as_str() {
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        digits => digits.parse().ok()?,
    };
    (3..=10).contains(&n).then_some(n)
}

/// Base color name for a paint description, or `"Unknown"`.
pub fn normalize_color(raw: &str) -> String {
    COLORS.lookup(raw).unwrap_or(UNKNOWN_COLOR).to_string()
}
