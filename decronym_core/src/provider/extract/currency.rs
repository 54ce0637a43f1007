//! ISO 4217 currency list (`ISO_4217 > CcyTbl > CcyNtry`)

use crate::error::ValidationError;
use crate::record::Record;
use quick_xml::Reader;
use quick_xml::events::Event;

pub const CURRENCY_TAGS: [&str; 2] = ["currency", "iso"];

#[derive(Clone, Copy, PartialEq)]
enum Field {
    None,
    Code,
    Name,
}

/// Every currency in the list, one record per distinct code and name
///
/// Many countries share a currency. Those repeats collapse into a single
/// record. Entries without a code (e.g. "ANTARCTICA") are skipped.
pub fn extract_currencies(xml: &str, source: &str) -> Result<Vec<Record>, ValidationError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records: Vec<Record> = Vec::new();
    let mut in_entry = false;
    let mut field = Field::None;
    let mut code = String::new();
    let mut name = String::new();
    let mut entries_seen = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"CcyNtry" => {
                    in_entry = true;
                    code.clear();
                    name.clear();
                }
                b"Ccy" if in_entry => field = Field::Code,
                b"CcyNm" if in_entry => field = Field::Name,
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if field != Field::None {
                    let text = e
                        .unescape()
                        .map_err(|err| ValidationError::schema(source, &err.to_string()))?;
                    match field {
                        Field::Code => code.push_str(&text),
                        Field::Name => name.push_str(&text),
                        Field::None => {}
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"Ccy" | b"CcyNm" => field = Field::None,
                b"CcyNtry" => {
                    in_entry = false;
                    entries_seen += 1;
                    if code.trim().is_empty() {
                        continue;
                    }
                    if let Ok(record) = Record::new(code.trim(), name.trim()) {
                        let record = record.with_source(source).with_tags(CURRENCY_TAGS);
                        if !records.contains(&record) {
                            records.push(record);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ValidationError::schema(
                    source,
                    &format!("XML error at position {}: {e}", reader.buffer_position()),
                ));
            }
            _ => {}
        }
    }

    if entries_seen == 0 {
        return Err(ValidationError::schema(source, "no CcyNtry entries"));
    }

    log::debug!(
        "Parsed {} currencies from {entries_seen} entries",
        records.len()
    );
    Ok(records)
}
