//! Order-link extraction from the "Link to Order More" cell.

use std::sync::OnceLock;

use regex::Regex;

fn hyperlink_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)^=?\s*HYPERLINK\s*\(\s*["']([^"']+)["']"#)
            .expect("built-in hyperlink pattern must compile")
    })
}

/// Pull a URL out of a link cell.
///
/// Accepts a raw URL, a quoted URL or a `HYPERLINK("url", "label")` formula.
/// Anything that does not start with `http://`, `https://` or `www.` is
/// discarded.
pub fn extract_order_link(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    let mut link = hyperlink_pattern()
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    if link.len() >= 2 && link.starts_with('"') && link.ends_with('"') {
        link = &link[1..link.len() - 1];
    }

    let looks_like_url =
        link.starts_with("http://") || link.starts_with("https://") || link.starts_with("www.");
    looks_like_url.then(|| link.to_string())
}
