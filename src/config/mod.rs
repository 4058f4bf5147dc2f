use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::automation::ResourceKind;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// Browser launch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Explicit Chrome/Chromium binary. Falls back to env and `PATH` lookup.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Extra command-line switches appended after the built-in ones.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    #[serde(default = "default_blocked_resources")]
    pub blocked_resources: Vec<ResourceKind>,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Navigation retry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NavigationConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Quiet period with no new network activity before a page counts as ready.
    #[serde(default = "default_idle_window_ms")]
    pub idle_window_ms: u64,
}

/// Field and About-group extraction configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_field_wait_ms")]
    pub field_wait_ms: u64,

    #[serde(default = "default_about_label")]
    pub about_label: String,

    #[serde(default = "default_tab_wait_ms")]
    pub tab_wait_ms: u64,

    #[serde(default = "default_tab_settle_ms")]
    pub tab_settle_ms: u64,

    #[serde(default = "default_panel_wait_ms")]
    pub panel_wait_ms: u64,

    #[serde(default)]
    pub about_items: ItemSource,
}

/// Where an About item's string comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    #[default]
    Text,
    /// The item's `aria-label` attribute.
    Label,
}

impl NavigationConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn idle_window(&self) -> Duration {
        Duration::from_millis(self.idle_window_ms)
    }
}

impl ExtractionConfig {
    pub fn field_wait(&self) -> Duration {
        Duration::from_millis(self.field_wait_ms)
    }

    pub fn tab_wait(&self) -> Duration {
        Duration::from_millis(self.tab_wait_ms)
    }

    pub fn tab_settle(&self) -> Duration {
        Duration::from_millis(self.tab_settle_ms)
    }

    pub fn panel_wait(&self) -> Duration {
        Duration::from_millis(self.panel_wait_ms)
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_blocked_resources() -> Vec<ResourceKind> {
    vec![
        ResourceKind::Image,
        ResourceKind::Stylesheet,
        ResourceKind::Font,
        ResourceKind::Media,
    ]
}
fn default_request_timeout_ms() -> u64 {
    60_000
}
fn default_max_attempts() -> u32 {
    3
}
fn default_attempt_timeout_secs() -> u64 {
    60
}
fn default_backoff_ms() -> u64 {
    5_000
}
fn default_idle_window_ms() -> u64 {
    500
}
fn default_field_wait_ms() -> u64 {
    5_000
}
fn default_about_label() -> String {
    "About".to_string()
}
fn default_tab_wait_ms() -> u64 {
    10_000
}
fn default_tab_settle_ms() -> u64 {
    3_000
}
fn default_panel_wait_ms() -> u64 {
    10_000
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            chrome_args: Vec::new(),
            blocked_resources: default_blocked_resources(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            backoff_ms: default_backoff_ms(),
            idle_window_ms: default_idle_window_ms(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            field_wait_ms: default_field_wait_ms(),
            about_label: default_about_label(),
            tab_wait_ms: default_tab_wait_ms(),
            tab_settle_ms: default_tab_settle_ms(),
            panel_wait_ms: default_panel_wait_ms(),
            about_items: ItemSource::default(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::Environment::with_prefix("POI")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("browser.blocked_resources")
                    .with_list_parse_key("browser.chrome_args")
                    .try_parsing(true),
            )
            .build()?;

        let app_cfg = cfg.try_deserialize().unwrap_or_else(|e| {
            warn!("Ignoring malformed configuration ({}), using defaults", e);
            AppConfig::default()
        });
        Ok(app_cfg)
    }
}
