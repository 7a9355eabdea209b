use std::sync::LazyLock;

use regex::Regex;

/// Slug format shared by blogs, categories, events and universities:
/// lowercase alphanumeric segments joined by single hyphens.
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug regex is valid"));

pub fn is_valid_slug(candidate: &str) -> bool {
    SLUG_RE.is_match(candidate)
}
