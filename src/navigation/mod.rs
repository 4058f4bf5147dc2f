//! Page loading with bounded retries.

use std::sync::atomic::{AtomicU32, Ordering};
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{info, warn};

use crate::automation::{NavigateOptions, PageSession, ResourceKind};
use crate::config::NavigationConfig;
use crate::error::{AutomationError, ScrapeError};

/// Drives one session to a loaded page.
pub struct Navigator<'a> {
    config: &'a NavigationConfig,
    blocked: &'a [ResourceKind],
}

impl<'a> Navigator<'a> {
    pub fn new(config: &'a NavigationConfig, blocked: &'a [ResourceKind]) -> Self {
        Self { config, blocked }
    }

    /// Block non-essential resources, then navigate until the page is ready.
    ///
    /// Returns the number of attempts used. Transient failures are retried
    /// after a fixed backoff; a fatal automation error stops immediately.
    pub async fn load(&self, page: &dyn PageSession, url: &str) -> Result<u32, ScrapeError> {
        if let Err(e) = page.block_resources(self.blocked).await {
            if e.is_fatal() {
                return Err(ScrapeError::AutomationFatal(e));
            }
            warn!(error = %e, "could not enable resource blocking, loading everything");
        }

        let max_attempts = self.config.max_attempts.max(1);
        let options = NavigateOptions {
            timeout: self.config.attempt_timeout(),
            idle_window: self.config.idle_window(),
        };
        let attempts = AtomicU32::new(0);

        let retries = FixedInterval::new(self.config.backoff()).take(max_attempts as usize - 1);

        let outcome = RetryIf::spawn(
            retries,
            || {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                let options = &options;
                async move {
                    info!(url, attempt, max_attempts, "navigating");
                    let result = tokio::time::timeout(options.timeout, page.navigate(url, options))
                        .await
                        .unwrap_or_else(|_| {
                            Err(AutomationError::Timeout(format!(
                                "page not ready within {:?}",
                                options.timeout
                            )))
                        });
                    if let Err(e) = &result {
                        warn!(url, attempt, error = %e, "navigation attempt failed");
                    }
                    result
                }
            },
            |e: &AutomationError| !e.is_fatal(),
        )
        .await;

        let attempts = attempts.load(Ordering::SeqCst);
        match outcome {
            Ok(()) => {
                info!(url, attempts, "page ready");
                Ok(attempts)
            }
            Err(e) if e.is_fatal() => Err(ScrapeError::AutomationFatal(e)),
            Err(source) => Err(ScrapeError::NavigationFailed { attempts, source }),
        }
    }
}
