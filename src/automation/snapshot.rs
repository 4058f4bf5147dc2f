//! Offline adapter: answers DOM queries from a saved HTML document.
//!
//! Useful for re-extracting a page captured earlier (`poi-scrape snapshot`)
//! and for exercising the pipeline without a browser. Navigation and clicks
//! are accepted as no-ops because the whole document is already present.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use super::{NavigateOptions, PageSession, Read, ResourceKind};
use crate::error::AutomationError;
use crate::models::RawSection;

pub struct HtmlSnapshot {
    html: String,
}

impl HtmlSnapshot {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }

    // The parsed document is not Send, so each query re-parses and never
    // holds it across an await.
    fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

fn parse_selector(s: &str) -> Result<Selector, AutomationError> {
    Selector::parse(s).map_err(|e| AutomationError::Selector(format!("{s}: {e:?}")))
}

fn read_element(el: ElementRef<'_>, read: &Read) -> Option<String> {
    match read {
        Read::Text => Some(el.text().collect()),
        Read::Attribute(name) => el.value().attr(name).map(str::to_string),
    }
}

#[async_trait]
impl PageSession for HtmlSnapshot {
    async fn block_resources(&self, _kinds: &[ResourceKind]) -> Result<(), AutomationError> {
        Ok(())
    }

    async fn navigate(&self, url: &str, _options: &NavigateOptions) -> Result<(), AutomationError> {
        debug!(url, "snapshot navigation is a no-op");
        Ok(())
    }

    async fn evaluate(&self, _script: &str) -> Result<Value, AutomationError> {
        Err(AutomationError::Unsupported("evaluate"))
    }

    async fn click(&self, selector: &str) -> Result<(), AutomationError> {
        let sel = parse_selector(selector)?;
        if self.document().select(&sel).next().is_some() {
            Ok(())
        } else {
            Err(AutomationError::Selector(format!("{selector}: no element to click")))
        }
    }

    async fn close(&self) -> Result<(), AutomationError> {
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, AutomationError> {
        let sel = parse_selector(selector)?;
        Ok(self.document().select(&sel).next().is_some())
    }

    async fn select_one(&self, selector: &str, read: &Read) -> Result<Option<String>, AutomationError> {
        let sel = parse_selector(selector)?;
        let doc = self.document();
        Ok(doc.select(&sel).next().and_then(|el| read_element(el, read)))
    }

    async fn select_all(&self, selector: &str, read: &Read) -> Result<Vec<String>, AutomationError> {
        let sel = parse_selector(selector)?;
        let doc = self.document();
        Ok(doc.select(&sel).filter_map(|el| read_element(el, read)).collect())
    }

    async fn select_sections(
        &self,
        container: &str,
        heading: &str,
        item: &str,
        read: &Read,
    ) -> Result<Vec<RawSection>, AutomationError> {
        let container_sel = parse_selector(container)?;
        let heading_sel = parse_selector(heading)?;
        let item_sel = parse_selector(item)?;
        let doc = self.document();

        Ok(doc
            .select(&container_sel)
            .map(|c| RawSection {
                title: c
                    .select(&heading_sel)
                    .next()
                    .map(|h| h.text().collect::<String>()),
                items: c
                    .select(&item_sel)
                    .filter_map(|el| read_element(el, read))
                    .collect(),
            })
            .collect())
    }
}
