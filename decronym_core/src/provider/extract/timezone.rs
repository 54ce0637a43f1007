//! Time zone abbreviation pages

use super::{collapse_whitespace, decode_entities, pattern, strip_tags};
use crate::record::Record;
use regex::Regex;
use std::sync::LazyLock;

/// Text the site shows instead of a 404 for an unknown abbreviation
pub const UNKNOWN_MARKER: &str = "Unknown timezone abbreviation";

pub const TIMEZONE_TAG: &str = "timezone";

static BCT_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"(?is)<([a-z][a-z0-9]*)\b[^>]*\bid\s*=\s*["']?bct["']?[^>]*>"#)
});

/// Extract the zone name for `key` from an abbreviation page
///
/// The name is the text trailing the last child of the `bct` element, e.g.
/// `<h1 id="bct"><span>CET</span> Central European Time</h1>`.
pub fn extract_timezone(html: &str, key: &str, source: &str) -> Option<Record> {
    if html.contains(UNKNOWN_MARKER) {
        return None;
    }

    let open = BCT_OPEN_RE.captures(html)?;
    let whole = open.get(0)?;
    let tag = open[1].to_ascii_lowercase();

    let rest = &html[whole.end()..];
    let close = format!("</{tag}");
    let inner_end = rest.to_ascii_lowercase().find(&close).unwrap_or(rest.len());
    let inner = &rest[..inner_end];

    let trailing = match inner.rfind('>') {
        Some(pos) => collapse_whitespace(&decode_entities(&inner[pos + 1..])),
        None => collapse_whitespace(&decode_entities(inner)),
    };
    let full = if trailing.is_empty() {
        strip_tags(inner)
    } else {
        trailing
    };

    Record::new(key.to_uppercase(), full)
        .ok()
        .map(|r| r.with_source(source).with_tags([TIMEZONE_TAG]))
}
