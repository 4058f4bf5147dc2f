use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

// ── POI record ────────────────────────────────────────────────────────────────

/// One extracted listing. Absent scalar fields stay empty; the record itself
/// always exists once the page has loaded.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoiRecord {
    pub url: String,
    pub title: String,
    pub avg_rating: Option<String>,
    pub total_number_of_reviews: Option<String>,
    pub description: String,
    pub category: String,
    pub address: String,
    pub open_hours: String,
    pub website_link: String,
    pub phone_number: String,
    pub reviews: Vec<String>,
    pub profile_picture_url: String,
    pub about: About,
}

// ── Field outcome ─────────────────────────────────────────────────────────────

/// Result of resolving one field through its locator chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedField {
    Found { value: String, locator: LocatorUsed },
    Absent,
}

/// Which entry of a chain produced the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorUsed {
    pub index: usize,
    pub selector: String,
}

impl ExtractedField {
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Found { value, .. } => Some(value),
            Self::Absent => None,
        }
    }

    pub fn into_value(self) -> Option<String> {
        match self {
            Self::Found { value, .. } => Some(value),
            Self::Absent => None,
        }
    }

    /// Value or empty string, for fields whose absence is rendered as `""`.
    pub fn or_empty(self) -> String {
        self.into_value().unwrap_or_default()
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

// ── About group ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AboutSubsection {
    pub title: String,
    pub items: Vec<String>,
}

/// Ordered title → items mapping. Serializes as a JSON object in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct About(Vec<AboutSubsection>);

impl About {
    /// Add a subsection. A repeated title replaces the earlier items in place.
    pub fn insert(&mut self, title: String, items: Vec<String>) {
        match self.0.iter_mut().find(|s| s.title == title) {
            Some(existing) => existing.items = items,
            None => self.0.push(AboutSubsection { title, items }),
        }
    }

    pub fn get(&self, title: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|s| s.title == title)
            .map(|s| s.items.as_slice())
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.title.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for About {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for section in &self.0 {
            map.serialize_entry(&section.title, &section.items)?;
        }
        map.end()
    }
}

// ── Raw DOM reads ─────────────────────────────────────────────────────────────

/// One repeated container as read from the page, before filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct RawSection {
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_about_serializes_in_insertion_order() {
        let mut about = About::default();
        about.insert("Service options".into(), vec!["Dine-in".into()]);
        about.insert("Accessibility".into(), vec!["Wheelchair".into(), "Parking".into()]);

        let json = serde_json::to_string(&about).unwrap();
        assert_eq!(
            json,
            r#"{"Service options":["Dine-in"],"Accessibility":["Wheelchair","Parking"]}"#
        );
    }

    #[test]
    fn test_about_repeated_title_replaces_in_place() {
        let mut about = About::default();
        about.insert("A".into(), vec!["1".into()]);
        about.insert("B".into(), vec!["2".into()]);
        about.insert("A".into(), vec!["3".into()]);

        assert_eq!(about.len(), 2);
        assert_eq!(about.titles().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(about.get("A"), Some(&["3".to_string()][..]));
    }

    #[test]
    fn test_empty_record_uses_camel_case_and_nulls() {
        let json = serde_json::to_value(PoiRecord::default()).unwrap();
        assert!(json["avgRating"].is_null());
        assert!(json["totalNumberOfReviews"].is_null());
        assert_eq!(json["phoneNumber"], "");
        assert_eq!(json["reviews"], serde_json::json!([]));
        assert_eq!(json["about"], serde_json::json!({}));
    }
}
