//! Chromium adapter using chromiumoxide.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    EnableParams, EventRequestPaused, FailRequestParams, RequestPattern,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{AutomationLayer, NavigateOptions, PageSession, ResourceKind};
use crate::config::BrowserConfig;
use crate::error::AutomationError;

/// Find the Chrome/Chromium binary: explicit config, then env, then `PATH`.
pub fn find_chromium(configured: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(path) = configured {
        return Some(path.clone());
    }

    for var in ["CHROME_PATH", "PUPPETEER_EXECUTABLE_PATH"] {
        if let Ok(p) = std::env::var(var) {
            let path = PathBuf::from(&p);
            if path.exists() {
                return Some(path);
            }
        }
    }

    ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"]
        .iter()
        .find_map(|name| which::which(name).ok())
}

impl ResourceKind {
    fn cdp(self) -> ResourceType {
        match self {
            Self::Image => ResourceType::Image,
            Self::Stylesheet => ResourceType::Stylesheet,
            Self::Font => ResourceType::Font,
            Self::Media => ResourceType::Media,
        }
    }
}

/// Launches one local Chromium process per session.
#[derive(Debug, Default, Clone)]
pub struct ChromiumLayer;

#[async_trait]
impl AutomationLayer for ChromiumLayer {
    async fn launch(&self, config: &BrowserConfig) -> Result<Box<dyn PageSession>, AutomationError> {
        let chrome = find_chromium(config.chrome_path.as_ref()).ok_or_else(|| {
            AutomationError::Launch(
                "Chrome/Chromium not found; set browser.chrome_path or CHROME_PATH".into(),
            )
        })?;

        let mut builder = CdpBrowserConfig::builder()
            .chrome_executable(&chrome)
            .request_timeout(Duration::from_millis(config.request_timeout_ms));

        // chromiumoxide runs headless unless told otherwise
        if !config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--disable-extensions");

        for arg in &config.chrome_args {
            builder = builder.arg(arg);
        }

        let cdp_config = builder
            .build()
            .map_err(|e| AutomationError::Launch(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| AutomationError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "browser handler event error");
                }
            }
            debug!("browser event handler exited");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(AutomationError::Launch(format!("failed to open page: {e}")));
            }
        };

        info!(chrome = %chrome.display(), headless = config.headless, "launched browser");

        Ok(Box::new(ChromiumSession {
            browser: Mutex::new(browser),
            page,
            tasks: std::sync::Mutex::new(vec![handler_task]),
            closed: AtomicBool::new(false),
        }))
    }
}

/// A single page in a launched Chromium.
pub struct ChromiumSession {
    browser: Mutex<Browser>,
    page: Page,
    tasks: std::sync::Mutex<Vec<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl ChromiumSession {
    fn track(&self, task: JoinHandle<()>) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(task);
        }
    }

    fn abort_tasks(&self) {
        if let Ok(mut tasks) = self.tasks.lock() {
            for task in tasks.drain(..) {
                task.abort();
            }
        }
    }

    /// Document complete and no new resource entries for `idle_window`.
    async fn wait_until_idle(&self, idle_window: Duration) -> Result<(), AutomationError> {
        const PROBE: &str = "[document.readyState, performance.getEntriesByType('resource').length]";
        let interval = Duration::from_millis(100);
        let mut last_count = None;
        let mut quiet_since = Instant::now();

        loop {
            let (state, count): (String, u64) = serde_json::from_value(self.evaluate(PROBE).await?)
                .map_err(|e| AutomationError::Script(e.to_string()))?;

            if last_count != Some(count) {
                last_count = Some(count);
                quiet_since = Instant::now();
            } else if state == "complete" && quiet_since.elapsed() >= idle_window {
                return Ok(());
            }

            tokio::time::sleep(interval).await;
        }
    }
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn block_resources(&self, kinds: &[ResourceKind]) -> Result<(), AutomationError> {
        if kinds.is_empty() {
            return Ok(());
        }

        let mut paused = self.page.event_listener::<EventRequestPaused>().await?;

        let patterns = kinds
            .iter()
            .map(|kind| RequestPattern {
                url_pattern: None,
                resource_type: Some(kind.cdp()),
                request_stage: None,
            })
            .collect();
        self.page
            .execute(EnableParams {
                patterns: Some(patterns),
                handle_auth_requests: None,
            })
            .await?;

        // Only blocked kinds are paused, so every paused request is failed.
        let page = self.page.clone();
        self.track(tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                let fail = FailRequestParams::new(event.request_id.clone(), ErrorReason::BlockedByClient);
                if let Err(e) = page.execute(fail).await {
                    debug!(error = %e, "failed to abort intercepted request");
                }
            }
        }));

        debug!(?kinds, "request interception enabled");
        Ok(())
    }

    async fn navigate(&self, url: &str, options: &NavigateOptions) -> Result<(), AutomationError> {
        let load = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| AutomationError::from_cdp_as(e, AutomationError::Navigation))?;
            // Some redirects finish after goto resolves
            let _ = self.page.wait_for_navigation().await;
            self.wait_until_idle(options.idle_window).await
        };

        tokio::time::timeout(options.timeout, load)
            .await
            .map_err(|_| AutomationError::Timeout(format!("navigation exceeded {:?}", options.timeout)))?
    }

    async fn evaluate(&self, script: &str) -> Result<Value, AutomationError> {
        let result = self.page.evaluate(script).await?;
        // null and undefined come back without a value
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn click(&self, selector: &str) -> Result<(), AutomationError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| {
                AutomationError::from_cdp_as(e, |msg| AutomationError::Selector(format!("{selector}: {msg}")))
            })?;
        element.click().await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), AutomationError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.abort_tasks();

        if let Err(e) = self.page.clone().close().await {
            debug!(error = %e, "page close failed");
        }

        let mut browser = self.browser.lock().await;
        let closed = browser.close().await;
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "waiting for browser exit failed");
        }
        closed?;

        info!("browser closed");
        Ok(())
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        // The Browser's own Drop kills the child process if close() never ran.
        self.abort_tasks();
    }
}
