//! About-group extraction: repeated containers, each a heading plus items.

use tracing::{debug, warn};

use crate::automation::{PageSession, Read};
use crate::config::ItemSource;
use crate::error::AutomationError;
use crate::models::{About, RawSection};
use crate::tabs::TabActivation;

/// Where subsections live inside the About panel.
#[derive(Debug, Clone)]
pub struct SectionPattern {
    pub container: String,
    pub heading: String,
    pub item: String,
    pub items: ItemSource,
}

impl SectionPattern {
    pub fn standard(items: ItemSource) -> Self {
        Self {
            container: "div.iP2t7d.fontBodyMedium".into(),
            heading: "h2.iL3Qke.fontTitleSmall".into(),
            item: "li.hpLkke span".into(),
            items,
        }
    }

    fn read(&self) -> Read {
        match self.items {
            ItemSource::Text => Read::Text,
            ItemSource::Label => Read::attribute("aria-label"),
        }
    }
}

/// Read every subsection after the tab step has finished.
///
/// An absent tab gives an empty mapping without touching the page. A
/// non-fatal read failure also degrades to empty.
pub async fn extract_about(
    page: &dyn PageSession,
    activation: &TabActivation,
    pattern: &SectionPattern,
) -> Result<About, AutomationError> {
    if !activation.is_activated() {
        debug!("about tab absent, skipping subsections");
        return Ok(About::default());
    }

    let raw = match page
        .select_sections(&pattern.container, &pattern.heading, &pattern.item, &pattern.read())
        .await
    {
        Ok(raw) => raw,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            warn!(error = %e, "about sections could not be read");
            return Ok(About::default());
        }
    };

    let about = collect_sections(raw);
    if about.is_empty() {
        warn!("about tab opened but no subsections were found");
    } else {
        debug!(sections = about.len(), "about subsections extracted");
    }
    Ok(about)
}

/// Trim titles and items; drop containers lacking either.
pub fn collect_sections(raw: Vec<RawSection>) -> About {
    let mut about = About::default();
    for section in raw {
        let Some(title) = section
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
        else {
            continue;
        };

        let items: Vec<String> = section
            .items
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .map(str::to_string)
            .collect();

        if items.is_empty() {
            debug!(title = %title, "dropping subsection without items");
            continue;
        }
        about.insert(title, items);
    }
    about
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::testing::FakePage;

    const PANEL: &str = r#"
        <div role="tabpanel" aria-label="About Corner Cafe">
          <div class="iP2t7d fontBodyMedium">
            <h2 class="iL3Qke fontTitleSmall"> Service options </h2>
            <ul>
              <li class="hpLkke"><span aria-label="Offers dine-in">Dine-in</span></li>
              <li class="hpLkke"><span aria-label="Offers takeout">Takeout</span></li>
            </ul>
          </div>
          <div class="iP2t7d fontBodyMedium">
            <h2 class="iL3Qke fontTitleSmall">Empty</h2>
            <ul><li class="hpLkke"><span>  </span></li></ul>
          </div>
          <div class="iP2t7d fontBodyMedium">
            <ul><li class="hpLkke"><span>Orphan item</span></li></ul>
          </div>
          <div class="iP2t7d fontBodyMedium">
            <h2 class="iL3Qke fontTitleSmall">Payments</h2>
            <ul><li class="hpLkke"><span aria-label="Accepts credit cards">Credit cards</span></li></ul>
          </div>
        </div>
    "#;

    fn activated() -> TabActivation {
        TabActivation::Activated {
            selector: "button".into(),
        }
    }

    #[tokio::test]
    async fn test_extracts_titles_and_items_in_order() {
        let page = FakePage::new(PANEL);
        let about = extract_about(&page, &activated(), &SectionPattern::standard(ItemSource::Text))
            .await
            .unwrap();

        assert_eq!(about.titles().collect::<Vec<_>>(), vec!["Service options", "Payments"]);
        assert_eq!(
            about.get("Service options"),
            Some(&["Dine-in".to_string(), "Takeout".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_label_items_use_aria_label() {
        let page = FakePage::new(PANEL);
        let about = extract_about(&page, &activated(), &SectionPattern::standard(ItemSource::Label))
            .await
            .unwrap();

        assert_eq!(about.get("Payments"), Some(&["Accepts credit cards".to_string()][..]));
        assert_eq!(about.len(), 2);
    }

    #[tokio::test]
    async fn test_absent_tab_skips_page_entirely() {
        let page = FakePage::new(PANEL);
        let about = extract_about(
            &page,
            &TabActivation::Absent,
            &SectionPattern::standard(ItemSource::Text),
        )
        .await
        .unwrap();

        assert!(about.is_empty());
        assert!(page.log.calls().is_empty());
    }

    #[test]
    fn test_collect_drops_untitled_and_itemless() {
        let about = collect_sections(vec![
            RawSection { title: Some("Title only".into()), items: vec![] },
            RawSection { title: None, items: vec!["x".into()] },
            RawSection { title: Some("   ".into()), items: vec!["x".into()] },
            RawSection { title: Some("Kept".into()), items: vec![" a ".into(), "".into(), "a".into()] },
        ]);

        assert_eq!(about.titles().collect::<Vec<_>>(), vec!["Kept"]);
        assert_eq!(about.get("Kept"), Some(&["a".to_string(), "a".to_string()][..]));
    }
}
