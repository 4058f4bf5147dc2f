//! Scripted session for unit tests: DOM reads come from an HTML fixture,
//! navigation outcomes are queued, and every round trip is recorded.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::snapshot::HtmlSnapshot;
use super::{AutomationLayer, NavigateOptions, PageSession, Read, ResourceKind};
use crate::config::BrowserConfig;
use crate::error::AutomationError;
use crate::models::RawSection;

#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, call: String) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

pub struct FakePage {
    dom: HtmlSnapshot,
    navigations: Mutex<VecDeque<Result<(), AutomationError>>>,
    pub log: CallLog,
}

impl FakePage {
    pub fn new(html: &str) -> Self {
        Self {
            dom: HtmlSnapshot::new(html),
            navigations: Mutex::new(VecDeque::new()),
            log: CallLog::default(),
        }
    }

    /// Queue navigation outcomes; once drained every navigation succeeds.
    pub fn with_navigations(self, outcomes: Vec<Result<(), AutomationError>>) -> Self {
        *self.navigations.lock().unwrap() = outcomes.into();
        self
    }
}

#[async_trait]
impl PageSession for FakePage {
    async fn block_resources(&self, kinds: &[ResourceKind]) -> Result<(), AutomationError> {
        self.log.push(format!("block:{kinds:?}"));
        Ok(())
    }

    async fn navigate(&self, url: &str, _options: &NavigateOptions) -> Result<(), AutomationError> {
        self.log.push(format!("navigate:{url}"));
        self.navigations.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn evaluate(&self, _script: &str) -> Result<Value, AutomationError> {
        self.log.push("evaluate".into());
        Err(AutomationError::Unsupported("evaluate"))
    }

    async fn click(&self, selector: &str) -> Result<(), AutomationError> {
        self.log.push(format!("click:{selector}"));
        self.dom.click(selector).await
    }

    async fn close(&self) -> Result<(), AutomationError> {
        self.log.push("close".into());
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, AutomationError> {
        self.log.push(format!("wait:{selector}"));
        self.dom.wait_for_selector(selector, timeout).await
    }

    async fn select_one(&self, selector: &str, read: &Read) -> Result<Option<String>, AutomationError> {
        self.log.push(format!("one:{selector}"));
        self.dom.select_one(selector, read).await
    }

    async fn select_all(&self, selector: &str, read: &Read) -> Result<Vec<String>, AutomationError> {
        self.log.push(format!("all:{selector}"));
        self.dom.select_all(selector, read).await
    }

    async fn select_sections(
        &self,
        container: &str,
        heading: &str,
        item: &str,
        read: &Read,
    ) -> Result<Vec<RawSection>, AutomationError> {
        self.log.push(format!("sections:{container}"));
        self.dom.select_sections(container, heading, item, read).await
    }
}

/// Implements only the primitive round trips, so DOM reads run through the
/// trait's `evaluate`-based defaults. Replies are served in order, then `null`.
pub struct ScriptedPage {
    replies: Mutex<VecDeque<Value>>,
    disconnected: bool,
    pub scripts: Mutex<Vec<String>>,
    pub log: CallLog,
}

impl ScriptedPage {
    pub fn replying(replies: Vec<Value>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            disconnected: false,
            scripts: Mutex::new(Vec::new()),
            log: CallLog::default(),
        }
    }

    /// Navigation succeeds, then every script fails as if the browser went away.
    pub fn disconnected() -> Self {
        Self {
            disconnected: true,
            ..Self::replying(Vec::new())
        }
    }
}

#[async_trait]
impl PageSession for ScriptedPage {
    async fn block_resources(&self, kinds: &[ResourceKind]) -> Result<(), AutomationError> {
        self.log.push(format!("block:{kinds:?}"));
        Ok(())
    }

    async fn navigate(&self, url: &str, _options: &NavigateOptions) -> Result<(), AutomationError> {
        self.log.push(format!("navigate:{url}"));
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, AutomationError> {
        self.log.push("evaluate".into());
        self.scripts.lock().unwrap().push(script.to_string());
        if self.disconnected {
            return Err(AutomationError::Disconnected("target closed".into()));
        }
        Ok(self.replies.lock().unwrap().pop_front().unwrap_or(Value::Null))
    }

    async fn click(&self, selector: &str) -> Result<(), AutomationError> {
        self.log.push(format!("click:{selector}"));
        Ok(())
    }

    async fn close(&self) -> Result<(), AutomationError> {
        self.log.push("close".into());
        Ok(())
    }
}

/// Hands out one prepared [`FakePage`] per launch and shares its call log.
pub struct FakeLayer {
    html: String,
    navigations: Mutex<Vec<Result<(), AutomationError>>>,
    fail_launch: bool,
    disconnect_after_load: bool,
    pub log: CallLog,
}

impl FakeLayer {
    pub fn new(html: &str) -> Self {
        Self {
            html: html.to_string(),
            navigations: Mutex::new(Vec::new()),
            fail_launch: false,
            disconnect_after_load: false,
            log: CallLog::default(),
        }
    }

    pub fn with_navigations(self, outcomes: Vec<Result<(), AutomationError>>) -> Self {
        *self.navigations.lock().unwrap() = outcomes;
        self
    }

    pub fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    /// Launch a [`ScriptedPage`] that loads fine and then loses its browser.
    pub fn disconnecting_after_load(mut self) -> Self {
        self.disconnect_after_load = true;
        self
    }
}

#[async_trait]
impl AutomationLayer for FakeLayer {
    async fn launch(&self, _config: &BrowserConfig) -> Result<Box<dyn PageSession>, AutomationError> {
        self.log.push("launch".into());
        if self.fail_launch {
            return Err(AutomationError::Launch("no browser".into()));
        }
        if self.disconnect_after_load {
            let mut page = ScriptedPage::disconnected();
            page.log = self.log.clone();
            return Ok(Box::new(page));
        }
        let outcomes = std::mem::take(&mut *self.navigations.lock().unwrap());
        let mut page = FakePage::new(&self.html).with_navigations(outcomes);
        page.log = self.log.clone();
        Ok(Box::new(page))
    }
}
