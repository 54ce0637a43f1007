//! Response bodies shaped like the real sources

use serde_json::json;

/// Time zone abbreviation page naming `name` in the `bct` element
pub fn timezone_page(name: &str) -> String {
    format!(
        r#"<html><body><header><h1 id="bct"><span class="a">Abbreviation:</span> {name}</h1></header></body></html>"#
    )
}

/// Time zone page for an abbreviation the site does not know
pub fn unknown_timezone_page() -> String {
    r#"<html><body><h1 id="bct">Unknown timezone abbreviation</h1></body></html>"#.to_string()
}

/// ISO 4217 list with one entry per `(country, code, name)`
pub fn currency_xml(entries: &[(&str, &str, &str)]) -> String {
    let body: String = entries
        .iter()
        .map(|(country, code, name)| {
            format!(
                "<CcyNtry><CtryNm>{country}</CtryNm><CcyNm>{name}</CcyNm><Ccy>{code}</Ccy></CcyNtry>"
            )
        })
        .collect();
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><ISO_4217 Pblshd="2024-06-25"><CcyTbl>{body}</CcyTbl></ISO_4217>"#)
}

/// Content API response for a page holding a three-column table
pub fn table_payload(title: &str, rows: &[(&str, &str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(acronym, full, comment)| {
            format!("<tr><td>{acronym}</td><td>{full}</td><td>{comment}</td></tr>")
        })
        .collect();
    let table = format!(
        "<table><tbody><tr><th>Acronym</th><th>Meaning</th><th>Notes</th></tr>{rows}</tbody></table>"
    );

    json!({
        "id": "1",
        "title": title,
        "body": {"storage": {"value": table, "representation": "storage"}},
    })
    .to_string()
}

/// Article whose lead sentence introduces `key` after `full`
pub fn wiki_article(full: &str, key: &str) -> String {
    format!(
        r#"<html><body><div class="mw-parser-output"><p><b>{full}</b> (<b>{key}</b>) is a subject of this article. More text follows.</p></div></body></html>"#
    )
}

/// Disambiguation page listing `meanings` under one section heading
pub fn wiki_disambiguation(key: &str, section: &str, meanings: &[&str]) -> String {
    let items: String = meanings
        .iter()
        .map(|m| {
            let slug = m.replace(' ', "_");
            format!(r#"<li><a href="/wiki/{slug}" title="{m}">{m}</a>, a meaning</li>"#)
        })
        .collect();
    let id = section.replace(' ', "_");

    format!(
        r#"<div class="mw-parser-output"><p><b>{key}</b> may refer to:</p><h2 id="{id}">{section}</h2><ul>{items}</ul></div>"#
    )
}
