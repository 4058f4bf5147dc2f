//! Resilient extraction of point-of-interest records from map listing pages
//! rendered in a headless browser.
//!
//! ```ignore
//! use std::sync::Arc;
//! use poi_scrape::{AppConfig, ChromiumLayer, PoiScraper};
//!
//! let scraper = PoiScraper::new(AppConfig::load()?, Arc::new(ChromiumLayer))?;
//! let record = scraper.scrape("https://www.google.com/maps/place/Corner Cafe/data=...").await?;
//! println!("{}", serde_json::to_string_pretty(&record)?);
//! ```

pub mod about;
pub mod automation;
pub mod config;
pub mod error;
pub mod locator;
pub mod models;
pub mod navigation;
pub mod normalize;
pub mod pipeline;
pub mod tabs;
pub mod utils;

pub use {
    automation::{AutomationLayer, PageSession, chromium::ChromiumLayer, snapshot::HtmlSnapshot},
    config::AppConfig,
    error::{AutomationError, ScrapeError},
    models::PoiRecord,
    pipeline::PoiScraper,
};
