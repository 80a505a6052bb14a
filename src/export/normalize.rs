//! Chapter body normalization.
//!
//! Scraped chapter HTML is mostly well-formed XHTML already. Two constructs
//! that are valid HTML but break XML parsers are rewritten; everything else is
//! passed through untouched.

use std::sync::LazyLock;

use regex::Regex;

/// Body used when a chapter has no content.
pub const MISSING_CONTENT: &str = "Content not found.";

static OPEN_BR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*>").expect("static regex"));

/// Prepare a chapter body for embedding in an XHTML page.
///
/// Missing or empty content becomes [`MISSING_CONTENT`]. `&nbsp;` becomes the
/// numeric `&#160;` (XHTML has no named entities beyond the XML five) and
/// unclosed `<br>` tags become `<br />`.
pub fn normalize_chapter_body(content: Option<&str>) -> String {
    let body = content.filter(|c| !c.is_empty()).unwrap_or(MISSING_CONTENT);
    let body = body.replace("&nbsp;", "&#160;");
    OPEN_BR.replace_all(&body, "<br />").into_owned()
}
