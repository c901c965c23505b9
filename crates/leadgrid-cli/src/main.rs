use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use leadgrid_client::ReqwestTransport;
use leadgrid_core::models::DEFAULT_RADIUS_METERS;
use leadgrid_core::{ScrapeService, ScraperConfig, SearchQuery, TokioSleeper, generate_grid};

#[derive(Parser)]
#[command(name = "leadgrid", version, about = "Business-listing aggregator over the places API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect, deduplicate, and enrich listings for a keyword in a city
    Scrape {
        /// City to search in
        #[arg(short, long)]
        city: String,

        /// Search keyword (e.g., "dentist")
        #[arg(short, long)]
        keyword: String,

        /// Sub-area of the city; repeat for several
        #[arg(short, long = "area")]
        areas: Vec<String>,

        /// Search radius in meters
        #[arg(short, long, default_value_t = DEFAULT_RADIUS_METERS)]
        radius: f64,

        /// Sweep a ring of points around the city instead of geocoding areas
        #[arg(long, default_value_t = false)]
        grid: bool,
    },

    /// Print the ring of search points around a center
    Grid {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Ring radius in meters
        #[arg(short, long, default_value_t = DEFAULT_RADIUS_METERS)]
        radius: f64,

        /// Number of points on the ring
        #[arg(short, long, default_value_t = 8)]
        points: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("leadgrid=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            city,
            keyword,
            areas,
            radius,
            grid,
        } => {
            let query = SearchQuery::new(city, keyword)
                .with_areas(areas)
                .with_radius(radius);
            cmd_scrape(&query, grid).await?;
        }
        Commands::Grid {
            lat,
            lng,
            radius,
            points,
        } => cmd_grid(lat, lng, radius, points)?,
    }

    Ok(())
}

async fn cmd_scrape(query: &SearchQuery, force_grid: bool) -> Result<()> {
    let mut config = ScraperConfig::from_env()?;
    if force_grid {
        config.grid_search = true;
    }

    let transport = ReqwestTransport::with_timeout(config.request_timeout)
        .context("Failed to create HTTP client")?;

    #[cfg(feature = "browser")]
    let scraper = Some(
        leadgrid_client::BrowserScraper::with_timeout(config.browser_timeout).allow_private_urls(),
    );
    #[cfg(not(feature = "browser"))]
    let scraper: Option<leadgrid_core::NoBrowser> = {
        if config.fallback_scraping {
            tracing::warn!("Fallback scraping needs the `browser` feature; skipping it");
        }
        None
    };

    let service = ScrapeService::from_config(&config, transport, TokioSleeper, scraper)?;

    tracing::info!(mode = ?service.mode(), "Scraping {} in {}", query.keyword, query.city);
    let report = service.run(query).await?;

    if !report.retry_logs.is_empty() {
        tracing::warn!(
            failures = report.retry_logs.len(),
            "Some lookups failed; see retry_logs"
        );
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_grid(lat: f64, lng: f64, radius: f64, points: usize) -> Result<()> {
    anyhow::ensure!(
        radius.is_finite() && radius > 0.0,
        "radius must be a positive number of meters"
    );
    anyhow::ensure!(points >= 1, "points must be at least 1");

    let grid = generate_grid(lat, lng, radius, points);
    println!("{}", serde_json::to_string_pretty(&grid)?);
    Ok(())
}
