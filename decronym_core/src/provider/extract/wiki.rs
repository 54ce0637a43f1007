//! Encyclopedia article and disambiguation pages
//!
//! A disambiguation page ("DMA may refer to:") lists one meaning per `<li>`,
//! grouped under section headings. A regular article introduces the acronym
//! in parentheses after its expansion: "Direct memory access (DMA) is ...".

use super::{collapse_whitespace, decode_entities, pattern, strip_tags};
use crate::record::Record;
use crate::settings::TagMap;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

pub const WIKI_TAG: &str = "wiki";

const DISAMBIGUATION_MARKER: &str = "may refer to";

static PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<p\b[^>]*>(.*?)</p>"));
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?is)<h[2-4]\b[^>]*>(.*?)</h[2-4]\s*>"));
static ID_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r#"(?i)\bid\s*=\s*"([^"]+)""#));
static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<li\b[^>]*>(.*?)</li>"));
static TITLED_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"(?is)<a\b[^>]*\btitle\s*=\s*"([^"]*)""#));
static LIST_END_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)</ul\s*>"));

/// Words that may sit between the capitalized words of an expansion
const CONNECTORS: [&str; 10] = ["of", "and", "for", "the", "in", "on", "to", "de", "a", "&"];

/// Extract every definition of `key` found on a page
pub fn extract_wiki(html: &str, key: &str, source: &str, tag_map: &TagMap) -> Vec<Record> {
    let key = key.to_uppercase();

    let disambiguation = PARAGRAPH_RE.captures_iter(html).find_map(|caps| {
        let text = strip_tags(&caps[1]);
        let whole = caps.get(0)?;
        (text.contains(DISAMBIGUATION_MARKER) && text.contains(&key)).then_some(whole.end())
    });

    match disambiguation {
        Some(list_start) => disambiguation_entries(html, list_start, &key, source, tag_map),
        None => article_entry(html, &key, source, tag_map).into_iter().collect(),
    }
}

fn disambiguation_entries(
    html: &str,
    list_start: usize,
    key: &str,
    source: &str,
    tag_map: &TagMap,
) -> Vec<Record> {
    let body = &html[list_start..];
    let headings: Vec<_> = HEADING_RE.captures_iter(body).collect();

    let mut records: Vec<Record> = Vec::new();
    let mut push = |record: Record| {
        if !records.contains(&record) {
            records.push(record);
        }
    };

    // Items listed right under the lead paragraph, before any heading
    let lead_end = headings
        .first()
        .and_then(|c| c.get(0))
        .map_or(body.len(), |m| m.start());
    let lead = &body[..lead_end];
    let lead = LIST_END_RE.find(lead).map_or(lead, |m| &lead[..m.end()]);
    let base_tags = BTreeSet::from([WIKI_TAG.to_string()]);
    for record in list_items(lead, key, source, &base_tags) {
        push(record);
    }

    for (index, heading) in headings.iter().enumerate() {
        let (Some(whole), Some(inner)) = (heading.get(0), heading.get(1)) else {
            continue;
        };
        let title = strip_tags(inner.as_str());
        if title.to_lowercase().contains("see also") {
            continue;
        }

        let section_end = headings
            .get(index + 1)
            .and_then(|c| c.get(0))
            .map_or(body.len(), |m| m.start());
        let section = &body[whole.end()..section_end];

        let id = ID_RE
            .captures(whole.as_str())
            .map(|c| c[1].replace('_', " "))
            .unwrap_or_else(|| title.clone());
        let mut tags = base_tags.clone();
        tags.extend(tag_map.tags_for(&id.to_lowercase()));

        for record in list_items(section, key, source, &tags) {
            push(record);
        }
    }

    records
}

fn list_items(fragment: &str, key: &str, source: &str, tags: &BTreeSet<String>) -> Vec<Record> {
    ITEM_RE
        .captures_iter(fragment)
        .filter_map(|item| {
            let inner = item.get(1)?.as_str();
            let title = TITLED_LINK_RE.captures(inner)?;
            let full = decode_entities(&title[1]);
            let full = full.trim_end_matches(" (page does not exist)").trim();
            let comment = strip_tags(inner);

            Record::new(key, full).ok().map(|r| {
                r.with_comment(comment)
                    .with_source(source)
                    .with_tags(tags.iter().cloned())
            })
        })
        .collect()
}

fn article_entry(html: &str, key: &str, source: &str, tag_map: &TagMap) -> Option<Record> {
    let marker = format!("({key}");

    for paragraph in PARAGRAPH_RE.captures_iter(html) {
        let text = strip_tags(&paragraph[1]);
        for sentence in text.split('.') {
            let Some(pos) = sentence.find(&marker) else {
                continue;
            };
            let Some(full) = expansion_before(&sentence[..pos], key) else {
                continue;
            };

            let comment = collapse_whitespace(sentence);
            let mut tags = BTreeSet::from([WIKI_TAG.to_string()]);
            tags.extend(tag_map.tags_for(&comment));

            return Record::new(key, full)
                .ok()
                .map(|r| r.with_comment(comment).with_source(source).with_tags(tags));
        }
    }

    None
}

/// Words immediately preceding the acronym's parenthesis that spell it out
///
/// Walks backwards matching word initials (hyphenated parts count
/// separately) against the acronym's letters. Connectors may sit in between
/// and a capitalized word whose initial does not match still consumes one
/// letter. The walk stops at any other lowercase word.
fn expansion_before(prefix: &str, key: &str) -> Option<String> {
    let mut remaining: Vec<char> = key
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let mut taken: Vec<&str> = Vec::new();
    for word in prefix.split_whitespace().rev() {
        if remaining.is_empty() {
            break;
        }

        let initials: Vec<char> = word
            .split('-')
            .filter_map(|part| part.chars().find(|c| c.is_alphanumeric()))
            .flat_map(char::to_lowercase)
            .collect();
        let is_connector = CONNECTORS.contains(&word.to_lowercase().as_str());
        let starts_upper = word.chars().next().is_some_and(char::is_uppercase);

        if !initials.is_empty() && remaining.ends_with(&initials) {
            remaining.truncate(remaining.len() - initials.len());
            taken.push(word);
        } else if is_connector && !taken.is_empty() {
            taken.push(word);
        } else if starts_upper {
            remaining.pop();
            taken.push(word);
        } else {
            break;
        }
    }

    while taken
        .last()
        .is_some_and(|w| CONNECTORS.contains(&w.to_lowercase().as_str()))
    {
        taken.pop();
    }

    if taken.is_empty() {
        return None;
    }

    taken.reverse();
    let full = taken
        .join(" ")
        .trim_matches(|c: char| c == ',' || c == '"' || c == '\'')
        .to_string();
    (!full.is_empty()).then_some(full)
}
