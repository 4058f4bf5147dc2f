//! Listing URL normalization.
//!
//! Shared map links often carry a raw place name with spaces and a `data=`
//! token whose `/g/` segment the browser would treat as a path separator.
//! [`normalize_listing_url`] rewrites just those two spots and leaves every
//! other byte alone.

use tracing::trace;
use url::Url;

use crate::error::ScrapeError;

const PLACE_MARKER: &str = "/place/";
const DATA_MARKER: &str = "/data=";
const GRAPH_ID_SEGMENT: &str = "/g/";
const GRAPH_ID_ESCAPED: &str = "%2Fg%2F";

/// Rewrite a raw listing URL into the form the browser should navigate to.
///
/// `https://maps.google.com/place/My Cafe/data=!16s/g/1abc?hl=en`
/// → `https://maps.google.com/place/My+Cafe/data=!16s%2Fg%2F1abc?hl=en`
///
/// Never fails. Applying it twice to a token that already holds `%2Fg%2F`
/// plus a second `/g/` escapes that second segment too.
pub fn normalize_listing_url(raw: &str) -> String {
    let (base, query) = match raw.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (raw, None),
    };

    let (before_data, data_token) = match base.split_once(DATA_MARKER) {
        Some((before, token)) => (before, Some(token)),
        None => {
            trace!("no {} token, skipping token escape", DATA_MARKER);
            (base, None)
        }
    };

    let mut out = encode_place_name(before_data);

    match data_token {
        Some(token) if !token.is_empty() => {
            out.push_str(DATA_MARKER);
            out.push_str(&token.replacen(GRAPH_ID_SEGMENT, GRAPH_ID_ESCAPED, 1));
        }
        Some(_) => trace!("empty {} token, dropping marker", DATA_MARKER),
        None => {}
    }

    if let Some(query) = query {
        out.push('?');
        out.push_str(query);
    }

    out
}

/// Replace spaces with `+` in the path segment right after `/place/`.
fn encode_place_name(path: &str) -> String {
    let Some((head, tail)) = path.split_once(PLACE_MARKER) else {
        trace!("no {} segment, skipping place-name encoding", PLACE_MARKER);
        return path.to_string();
    };

    let (name, rest) = match tail.split_once('/') {
        Some((name, rest)) => (name, Some(rest)),
        None => (tail, None),
    };

    let mut out = String::with_capacity(path.len());
    out.push_str(head);
    out.push_str(PLACE_MARKER);
    out.push_str(&name.replace(' ', "+"));
    if let Some(rest) = rest {
        out.push('/');
        out.push_str(rest);
    }
    out
}

/// Reject input the browser could never load, before a browser is launched.
pub fn validate(normalized: &str) -> Result<Url, ScrapeError> {
    let invalid = |reason: String| ScrapeError::InvalidUrl {
        url: normalized.to_string(),
        reason,
    };

    if normalized.trim().is_empty() {
        return Err(invalid("input url is required".into()));
    }

    let url = Url::parse(normalized).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_place_name_and_graph_token() {
        assert_eq!(
            normalize_listing_url(
                "https://maps.google.com/place/My Cafe/data=!3m1!4b1!16s/g/1abcde?hl=en"
            ),
            "https://maps.google.com/place/My+Cafe/data=!3m1!4b1!16s%2Fg%2F1abcde?hl=en"
        );
    }

    #[test]
    fn test_urls_without_markers_are_unchanged() {
        for url in [
            "https://example.com/",
            "https://example.com/search?q=coffee shop",
            "https://maps.google.com/maps/@44.97,-93.26,15z",
            "no scheme at all",
            "",
            "https://example.com/a/g/b?x=/g/",
        ] {
            assert_eq!(normalize_listing_url(url), url);
        }
    }

    #[test]
    fn test_rest_of_place_path_is_untouched() {
        assert_eq!(
            normalize_listing_url("https://m.g.com/maps/place/Blue Door Pub/@44.9,-93.1,17z/x y"),
            "https://m.g.com/maps/place/Blue+Door+Pub/@44.9,-93.1,17z/x y"
        );
    }

    #[test]
    fn test_place_without_data_token() {
        assert_eq!(
            normalize_listing_url("https://m.g.com/place/A B?hl=en"),
            "https://m.g.com/place/A+B?hl=en"
        );
    }

    #[test]
    fn test_data_token_without_place() {
        assert_eq!(
            normalize_listing_url("https://m.g.com/maps/data=!1s/g/11x"),
            "https://m.g.com/maps/data=!1s%2Fg%2F11x"
        );
    }

    #[test]
    fn test_empty_data_token_drops_marker() {
        assert_eq!(
            normalize_listing_url("https://m.g.com/place/A B/data=?hl=en"),
            "https://m.g.com/place/A+B?hl=en"
        );
        assert_eq!(
            normalize_listing_url("https://m.g.com/place/A B/data="),
            "https://m.g.com/place/A+B"
        );
    }

    #[test]
    fn test_only_first_graph_segment_is_escaped() {
        assert_eq!(
            normalize_listing_url("https://m.g.com/place/X/data=/g/a/g/b"),
            "https://m.g.com/place/X/data=%2Fg%2Fa/g/b"
        );
    }

    #[test]
    fn test_query_is_split_at_first_question_mark() {
        assert_eq!(
            normalize_listing_url("https://m.g.com/place/A B/data=/g/1?a=1?b=/g/"),
            "https://m.g.com/place/A+B/data=%2Fg%2F1?a=1?b=/g/"
        );
    }

    #[test]
    fn test_double_normalization_is_not_idempotent() {
        let once = normalize_listing_url("https://m.g.com/place/X/data=/g/a/g/b");
        let twice = normalize_listing_url(&once);
        assert_ne!(once, twice);
        assert_eq!(twice, "https://m.g.com/place/X/data=%2Fg%2Fa%2Fg%2Fb");
    }

    #[test]
    fn test_validate_rejects_empty_and_non_http() {
        assert!(matches!(validate(""), Err(ScrapeError::InvalidUrl { .. })));
        assert!(matches!(validate("   "), Err(ScrapeError::InvalidUrl { .. })));
        assert!(matches!(
            validate("file:///etc/passwd"),
            Err(ScrapeError::InvalidUrl { .. })
        ));
        assert!(validate("https://maps.google.com/place/A+B").is_ok());
    }
}
