//! Locator chains: every field is read through an ordered list of
//! selector + strategy pairs, and the first usable value wins.

pub mod table;

use regex::Regex;
use std::time::Duration;
use tracing::debug;

use crate::automation::{PageSession, Read};
use crate::error::AutomationError;
use crate::models::{ExtractedField, LocatorUsed};

pub use self::table::PoiFields;

// ── Strategies ────────────────────────────────────────────────────────────────

/// How the raw DOM string becomes a field value.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Trimmed `textContent`.
    Text,
    /// Trimmed attribute value.
    Attribute(&'static str),
    /// First capture group of `pattern` run over the attribute value.
    AttributeCapture { attr: &'static str, pattern: Regex },
    /// First capture group of `pattern` run over `textContent`.
    TextCapture(Regex),
    /// Last newline-delimited segment of `textContent`.
    LastLine,
}

impl Strategy {
    pub fn capture(attr: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::AttributeCapture {
            attr,
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn text_capture(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::TextCapture(Regex::new(pattern)?))
    }

    fn read(&self) -> Read {
        match self {
            Self::Text | Self::TextCapture(_) | Self::LastLine => Read::Text,
            Self::Attribute(attr) | Self::AttributeCapture { attr, .. } => Read::attribute(attr),
        }
    }

    /// Turn a raw read into a candidate value; `None` when nothing usable remains.
    pub fn extract(&self, raw: &str) -> Option<String> {
        let value = match self {
            Self::Text | Self::Attribute(_) => raw.trim(),
            Self::AttributeCapture { pattern, .. } | Self::TextCapture(pattern) => {
                let caps = pattern.captures(raw)?;
                caps.get(1).or_else(|| caps.get(0))?.as_str().trim()
            }
            Self::LastLine => raw.trim_end().rsplit('\n').next().unwrap_or_default().trim(),
        };
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// What a well-formed value of a field looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    #[default]
    Any,
    /// Decimal number; `,` accepted as decimal separator. Kept as written.
    Number,
    /// Whole count; thousands separators are stripped.
    Count,
}

impl Shape {
    pub fn accept(self, value: String) -> Option<String> {
        match self {
            Self::Any => Some(value),
            Self::Number => value
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(|_| value),
            Self::Count => {
                let digits: String = value
                    .chars()
                    .filter(|c| !matches!(c, ',' | '.' | ' ' | '\u{a0}' | '\u{202f}'))
                    .collect();
                (!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())).then_some(digits)
            }
        }
    }
}

// ── Locators ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Locator {
    pub selector: String,
    pub strategy: Strategy,
}

impl Locator {
    pub fn new(selector: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            selector: selector.into(),
            strategy,
        }
    }

    pub fn text(selector: impl Into<String>) -> Self {
        Self::new(selector, Strategy::Text)
    }

    pub fn attr(selector: impl Into<String>, attr: &'static str) -> Self {
        Self::new(selector, Strategy::Attribute(attr))
    }
}

/// A scalar field and its ordered fallbacks.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub locators: Vec<Locator>,
    pub shape: Shape,
}

/// A repeated field read from every match of one locator.
#[derive(Debug, Clone)]
pub struct ListSpec {
    pub name: &'static str,
    pub locator: Locator,
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// Walk `field`'s chain in order and stop at the first usable value.
///
/// Each locator may wait up to `wait` for its selector. Non-fatal automation
/// errors count as a miss; only a fatal one is returned.
pub async fn resolve(
    page: &dyn PageSession,
    field: &FieldSpec,
    wait: Duration,
) -> Result<ExtractedField, AutomationError> {
    for (index, locator) in field.locators.iter().enumerate() {
        match try_locator(page, locator, field.shape, wait).await {
            Ok(Some(value)) => {
                debug!(field = field.name, index, selector = %locator.selector, "field resolved");
                return Ok(ExtractedField::Found {
                    value,
                    locator: LocatorUsed {
                        index,
                        selector: locator.selector.clone(),
                    },
                });
            }
            Ok(None) => {
                debug!(field = field.name, index, selector = %locator.selector, "locator missed");
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                debug!(field = field.name, index, error = %e, "locator failed");
            }
        }
    }

    debug!(field = field.name, "locator chain exhausted, field absent");
    Ok(ExtractedField::Absent)
}

async fn try_locator(
    page: &dyn PageSession,
    locator: &Locator,
    shape: Shape,
    wait: Duration,
) -> Result<Option<String>, AutomationError> {
    if !page.wait_for_selector(&locator.selector, wait).await? {
        return Ok(None);
    }

    let raw = page.select_one(&locator.selector, &locator.strategy.read()).await?;
    Ok(raw
        .and_then(|r| locator.strategy.extract(&r))
        .and_then(|v| shape.accept(v)))
}

/// Every value `list` yields, in document order. Entries the strategy
/// rejects are dropped; a non-fatal failure yields an empty list.
pub async fn resolve_list(
    page: &dyn PageSession,
    list: &ListSpec,
    wait: Duration,
) -> Result<Vec<String>, AutomationError> {
    let locator = &list.locator;
    let read = async {
        if !page.wait_for_selector(&locator.selector, wait).await? {
            return Ok(Vec::new());
        }
        page.select_all(&locator.selector, &locator.strategy.read()).await
    };

    match read.await {
        Ok(raw) => {
            let values: Vec<String> = raw
                .iter()
                .filter_map(|r| locator.strategy.extract(r))
                .collect();
            debug!(field = list.name, count = values.len(), "list resolved");
            Ok(values)
        }
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            debug!(field = list.name, error = %e, "list read failed, using empty list");
            Ok(Vec::new())
        }
    }
}
