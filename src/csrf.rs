use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref META_TAG: Regex = Regex::new(r"(?i)<meta\s+[^>]*>").unwrap();
    static ref NAME_ATTR: Regex = Regex::new(r#"(?i)\bname\s*=\s*["']csrf-token["']"#).unwrap();
    static ref CONTENT_ATTR: Regex = Regex::new(r#"(?i)\bcontent\s*=\s*["']([^"']*)["']"#).unwrap();
}

/// Read the CSRF token embedded in a page's `<meta name="csrf-token">` tag.
///
/// Returns `None` when the tag is absent or its content is empty, in which
/// case requests go out without the header.
pub fn token_from_meta(html: &str) -> Option<String> {
    META_TAG
        .find_iter(html)
        .map(|m| m.as_str())
        .filter(|tag| NAME_ATTR.is_match(tag))
        .find_map(|tag| CONTENT_ATTR.captures(tag))
        .map(|caps| caps[1].to_string())
        .filter(|token| !token.is_empty())
}
