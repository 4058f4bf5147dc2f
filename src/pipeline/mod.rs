//! Record aggregator: ties normalization → navigation → fields → About together.
//!
//! ## Steps
//!
//! `scrape()` handles one listing per call:
//!   1. Normalize and validate the URL (no browser yet)
//!   2. Launch a session and load the page with retries
//!   3. Resolve every scalar field and both review lists concurrently
//!   4. Open the About tab, then read its subsections
//!   5. Close the session, whatever happened above
//!
//! `scrape_about()` runs steps 1, 2, 4 and 5 and returns only the About groups.
//!
//! Only a navigation failure or a fatal automation error aborts the call;
//! every other miss leaves its field empty.

use std::sync::Arc;
use tracing::{info, warn};

use crate::about::{SectionPattern, extract_about};
use crate::automation::{AutomationLayer, PageSession};
use crate::config::AppConfig;
use crate::error::ScrapeError;
use crate::locator::{PoiFields, resolve, resolve_list};
use crate::models::{About, PoiRecord};
use crate::navigation::Navigator;
use crate::normalize::{normalize_listing_url, validate};
use crate::tabs::TabActivator;

pub struct PoiScraper {
    config: AppConfig,
    layer: Arc<dyn AutomationLayer>,
    fields: PoiFields,
}

impl PoiScraper {
    pub fn new(config: AppConfig, layer: Arc<dyn AutomationLayer>) -> Result<Self, regex::Error> {
        Ok(Self {
            config,
            layer,
            fields: PoiFields::standard()?,
        })
    }

    /// Scrape one listing URL in its own browser session.
    pub async fn scrape(&self, raw_url: &str) -> Result<PoiRecord, ScrapeError> {
        let (url, session) = self.open(raw_url).await?;
        let result = self.scrape_session(session.as_ref(), &url).await;
        release(session, result).await
    }

    /// Load a listing in its own session and read only its About groups.
    pub async fn scrape_about(&self, raw_url: &str) -> Result<About, ScrapeError> {
        let (url, session) = self.open(raw_url).await?;
        let result = self.about_session(session.as_ref(), &url).await;
        release(session, result).await
    }

    async fn open(&self, raw_url: &str) -> Result<(String, Box<dyn PageSession>), ScrapeError> {
        let url = normalize_listing_url(raw_url);
        validate(&url)?;

        let session = self
            .layer
            .launch(&self.config.browser)
            .await
            .map_err(ScrapeError::AutomationFatal)?;
        Ok((url, session))
    }

    /// Run the extraction steps on a session the caller owns and will close.
    pub async fn scrape_session(
        &self,
        page: &dyn PageSession,
        url: &str,
    ) -> Result<PoiRecord, ScrapeError> {
        Navigator::new(&self.config.navigation, &self.config.browser.blocked_resources)
            .load(page, url)
            .await?;

        let wait = self.config.extraction.field_wait();
        let f = &self.fields;

        let (
            title,
            avg_rating,
            total_reviews,
            description,
            category,
            address,
            open_hours,
            website,
            phone,
            profile_picture,
            primary_reviews,
            secondary_reviews,
        ) = tokio::try_join!(
            resolve(page, &f.title, wait),
            resolve(page, &f.avg_rating, wait),
            resolve(page, &f.total_reviews, wait),
            resolve(page, &f.description, wait),
            resolve(page, &f.category, wait),
            resolve(page, &f.address, wait),
            resolve(page, &f.open_hours, wait),
            resolve(page, &f.website, wait),
            resolve(page, &f.phone, wait),
            resolve(page, &f.profile_picture, wait),
            resolve_list(page, &f.reviews_primary, wait),
            resolve_list(page, &f.reviews_secondary, wait),
        )
        .map_err(ScrapeError::AutomationFatal)?;

        let found = [
            &title,
            &avg_rating,
            &total_reviews,
            &description,
            &category,
            &address,
            &open_hours,
            &website,
            &phone,
            &profile_picture,
        ]
        .iter()
        .filter(|field| field.is_found())
        .count();

        let about = self.read_about(page).await?;

        let reviews: Vec<String> = primary_reviews.into_iter().chain(secondary_reviews).collect();

        info!(
            url,
            found,
            fields = f.scalars().len(),
            reviews = reviews.len(),
            about_sections = about.len(),
            "record assembled"
        );

        Ok(PoiRecord {
            url: url.to_string(),
            title: title.or_empty(),
            avg_rating: avg_rating.into_value(),
            total_number_of_reviews: total_reviews.into_value(),
            description: description.or_empty(),
            category: category.or_empty(),
            address: address.or_empty(),
            open_hours: open_hours.or_empty(),
            website_link: website.or_empty(),
            phone_number: phone.or_empty(),
            reviews,
            profile_picture_url: profile_picture.or_empty(),
            about,
        })
    }

    /// About-only counterpart of [`Self::scrape_session`]; the caller closes `page`.
    pub async fn about_session(&self, page: &dyn PageSession, url: &str) -> Result<About, ScrapeError> {
        Navigator::new(&self.config.navigation, &self.config.browser.blocked_resources)
            .load(page, url)
            .await?;

        let about = self.read_about(page).await?;
        info!(url, about_sections = about.len(), "about groups read");
        Ok(about)
    }

    async fn read_about(&self, page: &dyn PageSession) -> Result<About, ScrapeError> {
        let extraction = &self.config.extraction;
        let activation = TabActivator::new(&extraction.about_label, extraction)
            .activate(page)
            .await
            .map_err(ScrapeError::AutomationFatal)?;
        extract_about(page, &activation, &SectionPattern::standard(extraction.about_items))
            .await
            .map_err(ScrapeError::AutomationFatal)
    }
}

/// Close a session this crate launched, keeping `result` over any close error.
async fn release<T>(
    session: Box<dyn PageSession>,
    result: Result<T, ScrapeError>,
) -> Result<T, ScrapeError> {
    if let Err(e) = session.close().await {
        warn!(error = %e, "failed to close browser session");
    }
    result
}
