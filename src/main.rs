use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use auction_scout::config::{BrowserConfig, LoggingConfig, ScoutConfig};
use auction_scout::extract::DetailExtractor;
use auction_scout::http::{HttpFetch, ReqwestFetcher};
use auction_scout::lookup::{JsonHistoryLookup, ScraperSoldLookup, SoldLookup};
use auction_scout::models::{ListingStatus, VehicleInput};
use auction_scout::normalize::normalize_vehicle;
use auction_scout::scrapers::{
    BringATrailerScraper, CarsAndBidsBrowserScraper, ListingFilter, ScraperTrait,
};
use auction_scout::DealFinder;

#[derive(Parser)]
#[command(name = "auction-scout", version, about = "Find underpriced vehicle auctions")]
struct Cli {
    /// TOML config file; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Bat,
    Carsandbids,
}

#[derive(clap::Args)]
struct FilterArgs {
    #[arg(long)]
    make: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    year_min: Option<i32>,
    #[arg(long)]
    year_max: Option<i32>,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape listings from one source
    Scrape {
        #[arg(long, value_enum)]
        source: SourceArg,
        #[command(flatten)]
        filter: FilterArgs,
        /// Completed auctions instead of active ones
        #[arg(long)]
        sold: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Fetch one listing page and print its extracted details
    Details { url: String },
    /// List the makes in the Bring a Trailer model catalogue
    Makes {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Normalize a JSON array of vehicle records
    Normalize { file: PathBuf },
    /// Score active auctions ending soon against historical sales
    Deals {
        #[arg(long, value_enum)]
        source: SourceArg,
        #[command(flatten)]
        filter: FilterArgs,
        /// JSON array of completed listings to use instead of live results
        #[arg(long)]
        history: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl FilterArgs {
    fn into_filter(self, status: ListingStatus) -> ListingFilter {
        ListingFilter {
            make: self.make,
            model: self.model,
            year_min: self.year_min,
            year_max: self.year_max,
            status,
        }
    }
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_scraper(
    source: SourceArg,
    fetcher: Arc<dyn HttpFetch>,
    browser: &BrowserConfig,
) -> Arc<dyn ScraperTrait> {
    match source {
        SourceArg::Bat => Arc::new(BringATrailerScraper::new(fetcher)),
        SourceArg::Carsandbids => Arc::new(
            CarsAndBidsBrowserScraper::new()
                .with_headless(browser.headless)
                .with_settle_time(Duration::from_millis(browser.settle_ms)),
        ),
    }
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("💾 Saved results to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ScoutConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging);

    let fetcher: Arc<dyn HttpFetch> =
        Arc::new(ReqwestFetcher::new(&config.http).context("Failed to create HTTP client")?);

    match cli.command {
        Command::Scrape {
            source,
            filter,
            sold,
            out,
        } => {
            let status = if sold { ListingStatus::Sold } else { ListingStatus::Active };
            let scraper = build_scraper(source, fetcher, &config.browser);
            let listings = scraper
                .scrape(&filter.into_filter(status))
                .await
                .with_context(|| format!("Scrape of {} failed", scraper.source_name()))?;

            info!("✅ Scraped {} listings from {}", listings.len(), scraper.source_name());
            for (i, listing) in listings.iter().enumerate() {
                let price = listing
                    .current_bid_amount()
                    .or_else(|| listing.resolved_sold_price())
                    .map_or_else(|| "no bid".to_string(), |p| format!("${p:.0}"));
                println!("{}. {} ({})", i + 1, listing.title, price);
                println!("   URL: {}", listing.url);
            }

            if let Some(out) = out {
                write_json(&out, &listings).await?;
            }
        }

        Command::Details { url } => {
            let extractor = DetailExtractor::new(fetcher);
            let detail = extractor
                .try_fetch_details(&url)
                .await
                .with_context(|| format!("Failed to fetch {url}"))?;
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }

        Command::Makes { out } => {
            let scraper = BringATrailerScraper::new(fetcher);
            let makes = scraper.scrape_makes().await.context("Failed to scrape makes")?;
            for make in &makes {
                println!("{make}");
            }
            if let Some(out) = out {
                write_json(&out, &makes).await?;
            }
        }

        Command::Normalize { file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let records: Vec<VehicleInput> =
                serde_json::from_str(&content).context("Expected a JSON array of vehicle records")?;
            let normalized: Vec<_> = records.iter().map(normalize_vehicle).collect();
            println!("{}", serde_json::to_string_pretty(&normalized)?);
        }

        Command::Deals {
            source,
            filter,
            history,
            out,
        } => {
            let lookup: Arc<dyn SoldLookup> = match history {
                Some(path) => Arc::new(
                    JsonHistoryLookup::from_file(&path)
                        .await
                        .with_context(|| format!("Failed to load history from {}", path.display()))?,
                ),
                None => Arc::new(ScraperSoldLookup::new(Arc::new(BringATrailerScraper::new(
                    fetcher.clone(),
                )))),
            };

            let finder = DealFinder::new(
                build_scraper(source, fetcher.clone(), &config.browser),
                DetailExtractor::new(fetcher),
                lookup,
            )
            .configured(&config);

            let report = finder
                .find_deals(&filter.into_filter(ListingStatus::Active))
                .await
                .context("Deal search failed")?;

            info!(
                "✅ {} deals from {} candidates",
                report.deals.len(),
                report.candidates_considered
            );
            for (i, deal) in report.deals.iter().enumerate() {
                println!(
                    "{}. [{}/10] {}: bid ${:.0} vs avg ${:.0} ({:+.1}%){}",
                    i + 1,
                    deal.deal_score,
                    deal.listing.title,
                    deal.current_bid,
                    deal.historical.mean,
                    deal.percentage_difference,
                    if deal.ending_soon { " ⏰" } else { "" }
                );
                println!("   URL: {}", deal.listing.url);
            }

            if let Some(out) = out {
                write_json(&out, &report).await?;
            }
        }
    }

    Ok(())
}
