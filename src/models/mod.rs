use serde::{Deserialize, Serialize};

pub mod deal;
pub mod listing;
pub mod vehicle;

pub use deal::{DealReport, DealResult, HistoricalComparable, PriceStats};
pub use listing::{parse_date, GearboxKind, ListingDetail, ListingStatus, RawListing, RawValue};
pub use vehicle::{Condition, Drivetrain, FuelType, NormalizedVehicle, Transmission, VehicleInput};

/// Auction platform a listing was scraped from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    BringATrailer,
    CarsAndBids,
}

impl Source {
    pub fn name(&self) -> &'static str {
        match self {
            Source::BringATrailer => "Bring a Trailer",
            Source::CarsAndBids => "Cars & Bids",
        }
    }
}
