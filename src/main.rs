use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use poi_scrape::normalize::normalize_listing_url;
use poi_scrape::{AppConfig, ChromiumLayer, HtmlSnapshot, PoiScraper, utils};

#[derive(Parser)]
#[command(name = "poi-scrape", about = "Extract POI records from map listing pages", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Load a listing in headless Chromium and print the record as JSON
    Scrape {
        url: String,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Load a listing and print only its About groups as `{ "about": ... }`
    About {
        url: String,

        #[arg(long)]
        pretty: bool,
    },

    /// Print the browser-safe form of a listing URL
    Normalize { url: String },

    /// Extract a record from a saved HTML page, without a browser
    Snapshot {
        file: PathBuf,

        /// URL to report in the record (default: the file path)
        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "poi_scrape=info,warn",
        1 => "poi_scrape=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Scrape { url, pretty } => {
            let _t = utils::Timer::start(format!("scrape {url}"));
            let scraper = PoiScraper::new(config, Arc::new(ChromiumLayer))
                .context("Failed to build locator table")?;
            let record = scraper
                .scrape(&url)
                .await
                .with_context(|| format!("Error scraping POI data from {url}"))?;
            print_json(&record, pretty)?;
        }

        Command::About { url, pretty } => {
            let _t = utils::Timer::start(format!("about {url}"));
            let scraper = PoiScraper::new(config, Arc::new(ChromiumLayer))
                .context("Failed to build locator table")?;
            let about = scraper
                .scrape_about(&url)
                .await
                .with_context(|| format!("Error scraping About data from {url}"))?;
            print_json(&serde_json::json!({ "about": about }), pretty)?;
        }

        Command::Normalize { url } => {
            println!("{}", normalize_listing_url(&url));
        }

        Command::Snapshot { file, url, pretty } => {
            let page = HtmlSnapshot::from_file(&file)
                .with_context(|| format!("Failed to read {:?}", file))?;
            let url = url.unwrap_or_else(|| file.display().to_string());

            let mut config = config;
            config.extraction.field_wait_ms = 0;
            config.extraction.tab_settle_ms = 0;
            config.navigation.idle_window_ms = 0;

            let scraper = PoiScraper::new(config, Arc::new(ChromiumLayer))
                .context("Failed to build locator table")?;
            let record = scraper
                .scrape_session(&page, &url)
                .await
                .with_context(|| format!("Error extracting POI data from {:?}", file))?;
            info!("Extracted {:?} from snapshot", record.title);
            print_json(&record, pretty)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
