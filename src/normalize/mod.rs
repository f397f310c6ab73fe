//! Mapping of free-text vehicle attributes onto a canonical vocabulary.
//!
//! Every function here is pure and total: unmatched text maps to an
//! `Unknown` sentinel and out-of-range numbers map to `None`.

pub mod make;
pub mod model;
pub mod numeric;
pub mod vocab;

pub use make::{lookup_make, match_make_prefix, normalize_make, title_case};
pub use model::normalize_model;
pub use numeric::{
    max_year, normalize_engine_size, normalize_horsepower, normalize_mileage, normalize_price,
    normalize_torque, normalize_vin, normalize_year, MIN_YEAR,
};
pub use vocab::{
    normalize_color, normalize_condition, normalize_drivetrain, normalize_fuel_type,
    normalize_transmission,
};

use crate::models::{NormalizedVehicle, VehicleInput};

/// Normalize the fields present on `input`. Absent fields stay absent.
pub fn normalize_vehicle(input: &VehicleInput) -> NormalizedVehicle {
    NormalizedVehicle {
        make: input.make.as_deref().map(normalize_make),
        model: input
            .model
            .as_deref()
            .map(|model| normalize_model(model, input.make.as_deref())),
        year: input.year.as_ref().and_then(normalize_year),
        mileage: input.mileage.as_ref().and_then(normalize_mileage),
        price: input.price.as_ref().and_then(normalize_price),
        vin: input.vin.as_deref().and_then(normalize_vin),
        condition: input.condition.as_deref().map(normalize_condition),
        exterior_color: input.exterior_color.as_deref().map(normalize_color),
        interior_color: input.interior_color.as_deref().map(normalize_color),
        transmission: input.transmission.as_deref().map(normalize_transmission),
        drivetrain: input.drivetrain.as_deref().map(normalize_drivetrain),
        fuel_type: input.fuel_type.as_deref().map(normalize_fuel_type),
        engine_size: input.engine_size.as_ref().and_then(normalize_engine_size),
        horsepower: input.horsepower.as_ref().and_then(normalize_horsepower),
        torque: input.torque.as_ref().and_then(normalize_torque),
    }
}
