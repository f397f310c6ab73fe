pub mod bringatrailer;
pub mod browser;
pub mod traits;
pub mod types;

pub use bringatrailer::BringATrailerScraper;
pub use browser::CarsAndBidsBrowserScraper;
pub use traits::ScraperTrait;
pub use types::{ListingFilter, VehicleIdentity};
