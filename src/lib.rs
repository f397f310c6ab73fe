//! Auction scout: scrape vehicle auctions, extract and normalize their
//! attributes, and score active listings against historical sales.

pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod lookup;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod scoring;
pub mod scrapers;

pub use config::ScoutConfig;
pub use error::{Error, FetchError, Result};
pub use pipeline::DealFinder;
