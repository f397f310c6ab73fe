use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::RawValue;
use crate::normalize;

/// Serialize a vocabulary enum as its display label and read it back
/// through the matching normalizer, so labels round-trip.
macro_rules! label_serde {
    ($ty:ty, $normalize:path) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok($normalize(&raw))
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Concours,
    Excellent,
    VeryGood,
    Good,
    Fair,
    Poor,
    Project,
    Unknown,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Condition::Concours => "Concours",
            Condition::Excellent => "Excellent",
            Condition::VeryGood => "Very Good",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
            Condition::Project => "Project",
            Condition::Unknown => "Unknown",
        })
    }
}

label_serde!(Condition, normalize::normalize_condition);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transmission {
    Manual,
    /// Manual with a known gear count
    SpeedManual(u8),
    Automatic,
    SemiAutomatic,
    Cvt,
    Sequential,
    Unknown,
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transmission::Manual => f.write_str("Manual"),
            Transmission::SpeedManual(gears) => write!(f, "{gears}-Speed Manual"),
            Transmission::Automatic => f.write_str("Automatic"),
            Transmission::SemiAutomatic => f.write_str("Semi-Automatic"),
            Transmission::Cvt => f.write_str("CVT"),
            Transmission::Sequential => f.write_str("Sequential"),
            Transmission::Unknown => f.write_str("Unknown"),
        }
    }
}

label_serde!(Transmission, normalize::normalize_transmission);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Drivetrain {
    Rwd,
    Fwd,
    Awd,
    FourWd,
    Unknown,
}

impl fmt::Display for Drivetrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Drivetrain::Rwd => "RWD",
            Drivetrain::Fwd => "FWD",
            Drivetrain::Awd => "AWD",
            Drivetrain::FourWd => "4WD",
            Drivetrain::Unknown => "Unknown",
        })
    }
}

label_serde!(Drivetrain, normalize::normalize_drivetrain);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuelType {
    Gasoline,
    Diesel,
    Electric,
    Hybrid,
    PlugInHybrid,
    FlexFuel,
    Hydrogen,
    NaturalGas,
    Propane,
    Unknown,
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FuelType::Gasoline => "Gasoline",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
            FuelType::PlugInHybrid => "Plug-In Hybrid",
            FuelType::FlexFuel => "Flex Fuel",
            FuelType::Hydrogen => "Hydrogen",
            FuelType::NaturalGas => "Natural Gas",
            FuelType::Propane => "Propane",
            FuelType::Unknown => "Unknown",
        })
    }
}

label_serde!(FuelType, normalize::normalize_fuel_type);

/// Vehicle attributes as they arrive from a source. Only the fields the
/// source provided are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exterior_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interior_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drivetrain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_size: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horsepower: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torque: Option<RawValue>,
}

/// Canonical projection of a vehicle. A `None` field was either absent on
/// input or could not be normalized; it is never a stand-in for zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedVehicle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exterior_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interior_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<Transmission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drivetrain: Option<Drivetrain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<FuelType>,
    /// Displacement in liters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horsepower: Option<u32>,
    /// Torque in lb-ft
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torque: Option<u32>,
}

impl From<&NormalizedVehicle> for VehicleInput {
    fn from(v: &NormalizedVehicle) -> Self {
        VehicleInput {
            make: v.make.clone(),
            model: v.model.clone(),
            year: v.year.map(RawValue::from),
            mileage: v.mileage.map(RawValue::from),
            price: v.price.map(RawValue::from),
            vin: v.vin.clone(),
            condition: v.condition.map(|c| c.to_string()),
            exterior_color: v.exterior_color.clone(),
            interior_color: v.interior_color.clone(),
            transmission: v.transmission.map(|t| t.to_string()),
            drivetrain: v.drivetrain.map(|d| d.to_string()),
            fuel_type: v.fuel_type.map(|f| f.to_string()),
            // With an explicit unit the bare-number cc heuristic never applies.
            engine_size: v.engine_size.map(|l| RawValue::Text(format!("{l:.1}L"))),
            horsepower: v.horsepower.map(RawValue::from),
            torque: v.torque.map(RawValue::from),
        }
    }
}
