//! Response body extractors
//!
//! Pure functions from a raw page or feed to [`Record`](crate::Record)s. They
//! never touch the network so they can be tested against fixture strings.

pub mod currency;
pub mod table;
pub mod timezone;
pub mod wiki;

pub use currency::extract_currencies;
pub use table::extract_table;
pub use timezone::extract_timezone;
pub use wiki::extract_wiki;

use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?s)<[^>]*>"));
static NUMERIC_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"&#(x[0-9a-fA-F]+|[0-9]+);"));
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"\s+"));

/// Decode the handful of HTML entities that show up in definitions
pub(crate) fn decode_entities(text: &str) -> String {
    let decoded = NUMERIC_ENTITY_RE.replace_all(text, |caps: &regex::Captures<'_>| {
        let value = &caps[1];
        let code = match value.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => value.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    decoded
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Visible text of an HTML fragment with whitespace collapsed
pub(crate) fn strip_tags(html: &str) -> String {
    let text = TAG_RE.replace_all(html, "");
    collapse_whitespace(&decode_entities(&text))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    SPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Compile a pattern that is known to be valid
pub(crate) fn pattern(source: &str) -> Regex {
    Regex::new(source).unwrap_or_else(|e| panic!("invalid built-in pattern {source}: {e}"))
}
