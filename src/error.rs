//! Error types for the automation layer and the scrape pipeline.

use thiserror::Error;

/// Failures reported by a [`PageSession`](crate::automation::PageSession) adapter.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("browser disconnected: {0}")]
    Disconnected(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("operation not supported by this adapter: {0}")]
    Unsupported(&'static str),
}

impl AutomationError {
    /// The browser can no longer be driven; nothing else on this page will succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Launch(_) | Self::Disconnected(_))
    }

    /// Classify a CDP failure for an operation with its own error kind:
    /// fatal failures pass through, anything else becomes `kind`.
    pub fn from_cdp_as(
        err: chromiumoxide::error::CdpError,
        kind: impl FnOnce(String) -> Self,
    ) -> Self {
        match Self::from(err) {
            fatal if fatal.is_fatal() => fatal,
            other => kind(other.to_string()),
        }
    }
}

impl From<chromiumoxide::error::CdpError> for AutomationError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        use chromiumoxide::error::CdpError;
        match err {
            CdpError::Timeout => Self::Timeout("CDP request timed out".into()),
            CdpError::ChannelSendError(..) | CdpError::NoResponse | CdpError::Ws(..) => {
                Self::Disconnected(err.to_string())
            }
            CdpError::LaunchExit(..) | CdpError::LaunchTimeout(..) | CdpError::LaunchIo(..) => {
                Self::Launch(err.to_string())
            }
            CdpError::JavascriptException(..) | CdpError::Serde(..) => Self::Script(err.to_string()),
            other => Self::Navigation(other.to_string()),
        }
    }
}

/// Errors that abort a whole scrape. Field-level misses never become one of these.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid listing url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("navigation failed after {attempts} attempt(s): {source}")]
    NavigationFailed {
        attempts: u32,
        #[source]
        source: AutomationError,
    },

    #[error("automation layer failure: {0}")]
    AutomationFatal(#[source] AutomationError),
}
