//! Automation Layer abstraction.
//!
//! The pipeline only talks to these traits. [`chromium`] drives a real
//! headless browser over CDP; [`snapshot`] answers the same queries from a
//! saved HTML document.

pub mod chromium;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

use crate::config::BrowserConfig;
use crate::error::AutomationError;
use crate::models::RawSection;

/// Network resource classes a session can refuse to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Stylesheet,
    Font,
    Media,
}

/// How a DOM value is read off a matched element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Read {
    /// `textContent`, untrimmed.
    Text,
    Attribute(String),
}

impl Read {
    pub fn attribute(name: &str) -> Self {
        Self::Attribute(name.to_string())
    }

    /// JS expression reading the value off an element bound to `el`.
    fn js(&self) -> Result<String, AutomationError> {
        Ok(match self {
            Self::Text => "el.textContent".to_string(),
            Self::Attribute(name) => format!("el.getAttribute({})", js_string(name)?),
        })
    }
}

#[derive(Debug, Clone)]
pub struct NavigateOptions {
    /// Upper bound for one navigation attempt, ready state included.
    pub timeout: Duration,
    /// No new network activity for this long counts as idle.
    pub idle_window: Duration,
}

/// Starts browser sessions.
#[async_trait]
pub trait AutomationLayer: Send + Sync {
    async fn launch(&self, config: &BrowserConfig) -> Result<Box<dyn PageSession>, AutomationError>;
}

/// One page in a driven browser.
///
/// Adapters must implement the primitive round trips. The DOM read helpers
/// have default implementations built on [`PageSession::evaluate`].
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Abort every request of the given kinds from now on.
    async fn block_resources(&self, kinds: &[ResourceKind]) -> Result<(), AutomationError>;

    /// Load `url` and wait for the ready state.
    async fn navigate(&self, url: &str, options: &NavigateOptions) -> Result<(), AutomationError>;

    async fn evaluate(&self, script: &str) -> Result<Value, AutomationError>;

    async fn click(&self, selector: &str) -> Result<(), AutomationError>;

    /// Release the page and its browser. Safe to call more than once.
    async fn close(&self) -> Result<(), AutomationError>;

    /// Poll until `selector` matches or `timeout` elapses. `Ok(false)` on timeout.
    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, AutomationError> {
        let check = format!("document.querySelector({}) !== null", js_string(selector)?);
        let deadline = Instant::now() + timeout;
        let interval = Duration::from_millis(100);

        loop {
            if self.evaluate(&check).await?.as_bool().unwrap_or(false) {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                trace!(selector, "selector wait timed out");
                return Ok(false);
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// First element matching `selector`, read per `read`. `None` when nothing
    /// matches or the attribute is missing.
    async fn select_one(&self, selector: &str, read: &Read) -> Result<Option<String>, AutomationError> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); return el ? {} : null; }})()",
            js_string(selector)?,
            read.js()?
        );
        match self.evaluate(&script).await? {
            Value::String(s) => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    /// Every element matching `selector` in document order; missing attributes are skipped.
    async fn select_all(&self, selector: &str, read: &Read) -> Result<Vec<String>, AutomationError> {
        let script = format!(
            "Array.from(document.querySelectorAll({})).map(el => {})",
            js_string(selector)?,
            read.js()?
        );
        let values: Vec<Option<String>> = serde_json::from_value(self.evaluate(&script).await?)
            .map_err(|e| AutomationError::Script(e.to_string()))?;
        Ok(values.into_iter().flatten().collect())
    }

    /// Each `container` with its first `heading` text and every `item` read per `read`.
    async fn select_sections(
        &self,
        container: &str,
        heading: &str,
        item: &str,
        read: &Read,
    ) -> Result<Vec<RawSection>, AutomationError> {
        let script = format!(
            r#"Array.from(document.querySelectorAll({container})).map(c => {{
                const h = c.querySelector({heading});
                return {{
                    title: h ? h.textContent : null,
                    items: Array.from(c.querySelectorAll({item}))
                        .map(el => {read})
                        .filter(v => v !== null),
                }};
            }})"#,
            container = js_string(container)?,
            heading = js_string(heading)?,
            item = js_string(item)?,
            read = read.js()?,
        );
        serde_json::from_value(self.evaluate(&script).await?)
            .map_err(|e| AutomationError::Script(e.to_string()))
    }
}

/// Quote a Rust string as a JS string literal.
fn js_string(s: &str) -> Result<String, AutomationError> {
    serde_json::to_string(s).map_err(|e| AutomationError::Script(e.to_string()))
}
