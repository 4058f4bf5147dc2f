//! Locator table for listing pages. Within each chain the most specific
//! selector comes first; later entries cover older or experimental layouts.

use super::{FieldSpec, ListSpec, Locator, Shape, Strategy};

/// Every field of a POI record and how to find it.
#[derive(Debug, Clone)]
pub struct PoiFields {
    pub title: FieldSpec,
    pub avg_rating: FieldSpec,
    pub total_reviews: FieldSpec,
    pub description: FieldSpec,
    pub category: FieldSpec,
    pub address: FieldSpec,
    pub open_hours: FieldSpec,
    pub website: FieldSpec,
    pub phone: FieldSpec,
    pub profile_picture: FieldSpec,
    /// Review snippets quoted inside accessible labels.
    pub reviews_primary: ListSpec,
    /// Full review bodies.
    pub reviews_secondary: ListSpec,
}

// Matches the rating block's digits, e.g. "1,234" in "1,234 reviews".
// An attached K/M suffix is captured so the count shape rejects "1.2K".
const DIGITS: &str = r"(\d[\d,.\x{a0}\x{202f}]*[KkMm]?)";

impl PoiFields {
    pub fn standard() -> Result<Self, regex::Error> {
        Ok(Self {
            title: FieldSpec {
                name: "title",
                shape: Shape::Any,
                locators: vec![
                    Locator::text("h1.DUwDvf"),
                    Locator::text("h1.fontHeadlineLarge"),
                    Locator::attr(r#"div[role="main"][aria-label]"#, "aria-label"),
                ],
            },
            avg_rating: FieldSpec {
                name: "avgRating",
                shape: Shape::Number,
                locators: vec![
                    Locator::text(r#".LBgpqf .fontBodyMedium .F7nice span span[aria-hidden="true"]"#),
                    Locator::text(r#".F7nice span[aria-hidden="true"]"#),
                    Locator::text("div.fontDisplayLarge"),
                ],
            },
            total_reviews: FieldSpec {
                name: "totalNumberOfReviews",
                shape: Shape::Count,
                locators: vec![
                    Locator::new(
                        r#".LBgpqf .fontBodyMedium .F7nice span span[aria-label*="reviews"]"#,
                        Strategy::capture("aria-label", DIGITS)?,
                    ),
                    Locator::new(
                        r#".LBgpqf .fontBodyMedium .F7nice span span[aria-label*="reviews"]"#,
                        Strategy::text_capture(DIGITS)?,
                    ),
                    Locator::new(
                        r#".F7nice span[aria-label*="reviews"]"#,
                        Strategy::capture("aria-label", DIGITS)?,
                    ),
                ],
            },
            description: FieldSpec {
                name: "description",
                shape: Shape::Any,
                locators: vec![
                    Locator::text("h2.bwoZTb.fontBodyMedium span"),
                    Locator::text("div.PYvSYb"),
                ],
            },
            category: FieldSpec {
                name: "category",
                shape: Shape::Any,
                locators: vec![Locator::text("button.DkEaL"), Locator::text("span.DkEaL")],
            },
            address: FieldSpec {
                name: "address",
                shape: Shape::Any,
                locators: vec![
                    Locator::new(
                        r#"button[aria-label^="Address"]"#,
                        Strategy::capture("aria-label", r"^[^:]*:\s*(.+)$")?,
                    ),
                    Locator::text(r#"button[data-item-id="address"]"#),
                ],
            },
            open_hours: FieldSpec {
                name: "openHours",
                shape: Shape::Any,
                locators: vec![
                    Locator::attr(".t39EBf.GUrTXd", "aria-label"),
                    Locator::attr(r#"div[aria-label*="Hide open hours"]"#, "aria-label"),
                ],
            },
            website: FieldSpec {
                name: "websiteLink",
                shape: Shape::Any,
                locators: vec![
                    Locator::attr(r#"a[aria-label^="Website"]"#, "href"),
                    Locator::attr(r#"a[data-item-id="authority"]"#, "href"),
                ],
            },
            phone: FieldSpec {
                name: "phoneNumber",
                shape: Shape::Any,
                locators: vec![
                    Locator::new(r#"button[aria-label^="Phone"]"#, Strategy::LastLine),
                    Locator::new(
                        r#"button[data-item-id^="phone:tel:"]"#,
                        Strategy::capture("data-item-id", r"^phone:tel:(.+)$")?,
                    ),
                ],
            },
            profile_picture: FieldSpec {
                name: "profilePictureUrl",
                shape: Shape::Any,
                locators: vec![
                    Locator::attr(r#"button.aoRNLd.kn2E5e.NMjTrf[aria-label^="Photo of"] img"#, "src"),
                    Locator::attr(r#"button.aoRNLd[aria-label^="Photo of"] img"#, "src"),
                    Locator::attr("button.aoRNLd img", "src"),
                ],
            },
            reviews_primary: ListSpec {
                name: "reviews.primary",
                locator: Locator::new(
                    r#".DUGVrf [jslog*="track:click"]"#,
                    Strategy::capture("aria-label", r#""([^"]*)""#)?,
                ),
            },
            reviews_secondary: ListSpec {
                name: "reviews.secondary",
                locator: Locator::text(".wiI7pd"),
            },
        })
    }

    /// Scalar fields, for iteration.
    pub fn scalars(&self) -> [&FieldSpec; 10] {
        [
            &self.title,
            &self.avg_rating,
            &self.total_reviews,
            &self.description,
            &self.category,
            &self.address,
            &self.open_hours,
            &self.website,
            &self.phone,
            &self.profile_picture,
        ]
    }
}
