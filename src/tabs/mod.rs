//! Activation of content groups hidden behind a tab control.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::automation::PageSession;
use crate::config::ExtractionConfig;
use crate::error::AutomationError;

/// Outcome of trying to open a tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabActivation {
    Activated { selector: String },
    /// No tab control matched, or it could not be clicked.
    Absent,
}

impl TabActivation {
    pub fn is_activated(&self) -> bool {
        matches!(self, Self::Activated { .. })
    }
}

/// Finds a tab by its accessible-label prefix and switches to it.
pub struct TabActivator {
    label: String,
    tab_wait: Duration,
    settle: Duration,
    panel_wait: Duration,
}

impl TabActivator {
    pub fn new(label: impl Into<String>, config: &ExtractionConfig) -> Self {
        Self {
            label: label.into(),
            tab_wait: config.tab_wait(),
            settle: config.tab_settle(),
            panel_wait: config.panel_wait(),
        }
    }

    /// Tab controls in the order they are tried.
    pub fn tab_selectors(&self) -> Vec<String> {
        let label = css_escape(&self.label);
        vec![
            format!(r#"button[aria-label^="{label}"][role="tab"]"#),
            format!(r#"button[aria-label="{label}"]"#),
            format!(r#"[role="tablist"] button[aria-label^="{label}"]"#),
        ]
    }

    /// Panels that show the tab's content once switched.
    pub fn panel_selectors(&self) -> Vec<String> {
        let label = css_escape(&self.label);
        vec![
            format!(r#"div[role="tabpanel"][aria-label^="{label}"]"#),
            format!(r#"div[aria-label^="{label}"]"#),
            format!(r#"div[role="region"][aria-label^="{label}"]"#),
        ]
    }

    /// Click the first matching tab control and give the page time to render it.
    ///
    /// The page signals nothing when the switch completes, so after the click
    /// this sleeps for the settle delay and then looks for the panel. Only a
    /// fatal automation error is returned.
    pub async fn activate(&self, page: &dyn PageSession) -> Result<TabActivation, AutomationError> {
        for selector in self.tab_selectors() {
            match page.wait_for_selector(&selector, self.tab_wait).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!(label = %self.label, selector = %selector, "tab locator missed");
                    continue;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    debug!(label = %self.label, selector = %selector, error = %e, "tab locator failed");
                    continue;
                }
            }

            if let Err(e) = page.click(&selector).await {
                if e.is_fatal() {
                    return Err(e);
                }
                warn!(label = %self.label, selector = %selector, error = %e, "tab click failed");
                continue;
            }

            tokio::time::sleep(self.settle).await;
            self.await_panel(page).await?;

            info!(label = %self.label, selector = %selector, "tab activated");
            return Ok(TabActivation::Activated { selector });
        }

        info!(label = %self.label, "tab not found, treating group as absent");
        Ok(TabActivation::Absent)
    }

    async fn await_panel(&self, page: &dyn PageSession) -> Result<(), AutomationError> {
        for selector in self.panel_selectors() {
            match page.wait_for_selector(&selector, self.panel_wait).await {
                Ok(true) => {
                    debug!(label = %self.label, selector = %selector, "tab panel visible");
                    return Ok(());
                }
                Ok(false) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => debug!(label = %self.label, selector = %selector, error = %e, "panel locator failed"),
            }
        }
        debug!(label = %self.label, "no panel locator matched after activation");
        Ok(())
    }
}

/// Escape text for use inside a double-quoted CSS attribute value.
fn css_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\a "),
            _ => out.push(c),
        }
    }
    out
}
