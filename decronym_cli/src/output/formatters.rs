use super::{LookupEntry, OutputFormatter};
use crate::terminal;
use anyhow::Result;
use colored::*;
use decronym_core::{Outcome, Record};
use serde_json::{Value, json};

const WRAP_WIDTH: usize = 72;

/// Text formatter for human-readable output
pub struct TextFormatter {
    use_color: bool,
}

impl TextFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn colorize(&self, text: &str, color: fn(&str) -> ColoredString) -> String {
        if self.use_color {
            color(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Full form with the letters that spell the acronym highlighted
    fn highlight_initials(&self, full: &str) -> String {
        if !self.use_color {
            return full.to_string();
        }
        full.chars()
            .map(|c| {
                let s = c.to_string();
                if c.is_uppercase() {
                    s.green().bold().to_string()
                } else {
                    s.bold().to_string()
                }
            })
            .collect()
    }

    fn format_record(&self, record: &Record) -> String {
        let mut output = format!("\t{}\n", self.highlight_initials(record.full()));

        for line in wrap(record.comment(), WRAP_WIDTH) {
            output.push_str(&format!("\t{}\n", self.colorize(&line, |s| s.white())));
        }

        if !record.tags().is_empty() {
            let tags: Vec<String> = record.tags().iter().map(|t| format!("[{t}]")).collect();
            output.push_str(&format!(
                "\t{}\n",
                self.colorize(&tags.join(" "), |s| s.green())
            ));
        }

        if !record.source().is_empty() {
            let source = if self.use_color && record.source().starts_with("http") {
                terminal::hyperlink(record.source(), record.source())
            } else {
                record.source().to_string()
            };
            output.push_str(&format!(
                "\t{}\n",
                self.colorize(&format!("from: {source}"), |s| s.blue())
            ));
        }

        output
    }
}

impl OutputFormatter for TextFormatter {
    fn format_single(&self, entry: &LookupEntry<'_>) -> Result<String> {
        let mut output = String::new();

        match entry.outcome {
            Outcome::Matched(records) => {
                output.push_str(&self.colorize(entry.acronym, |s| s.green().bold()));
                output.push('\n');
                for record in records {
                    output.push_str(&self.format_record(record));
                }
            }
            Outcome::Filtered(records) => {
                output.push_str(&self.colorize(
                    &format!(
                        "{} entries for '{}' filtered, try running without tags?",
                        records.len(),
                        entry.acronym
                    ),
                    |s| s.yellow(),
                ));
                output.push('\n');
            }
            Outcome::NotFound { suggestions } => {
                output.push_str(&self.colorize(
                    &format!("No entries for '{}' found!", entry.acronym),
                    |s| s.red(),
                ));
                output.push('\n');
                if !suggestions.is_empty() {
                    output.push_str(&format!("Suggested: {}\n", suggestions.join(", ")));
                }
            }
        }

        Ok(output)
    }
}

/// Greedy word wrap; a single overlong word gets its own line
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn status(outcome: &Outcome<'_>) -> &'static str {
    match outcome {
        Outcome::Matched(_) => "matched",
        Outcome::Filtered(_) => "filtered",
        Outcome::NotFound { .. } => "not_found",
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_value(entry: &LookupEntry<'_>) -> Result<Value> {
        let (records, suggestions): (&[Record], &[String]) = match entry.outcome {
            Outcome::Matched(records) | Outcome::Filtered(records) => (records, &[][..]),
            Outcome::NotFound { suggestions } => (&[][..], suggestions),
        };

        Ok(json!({
            "acronym": entry.acronym,
            "status": status(&entry.outcome),
            "records": serde_json::to_value(records)?,
            "suggestions": suggestions,
        }))
    }

    fn render(&self, value: &Value) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_single(&self, entry: &LookupEntry<'_>) -> Result<String> {
        self.render(&Self::to_value(entry)?)
    }

    fn format_batch(&self, entries: &[LookupEntry<'_>]) -> Result<String> {
        let values = entries
            .iter()
            .map(Self::to_value)
            .collect::<Result<Vec<_>>>()?;
        self.render(&Value::Array(values))
    }
}

/// CSV formatter, one row per record or per unmatched acronym
pub struct CsvFormatter;

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self
    }

    const HEADER: [&'static str; 7] = [
        "acronym",
        "status",
        "full",
        "comment",
        "source",
        "tags",
        "suggestions",
    ];

    fn write_rows(writer: &mut csv::Writer<Vec<u8>>, entry: &LookupEntry<'_>) -> Result<()> {
        let status = status(&entry.outcome);
        match entry.outcome {
            Outcome::Matched(records) | Outcome::Filtered(records) => {
                for record in records {
                    let tags = record.tags().iter().cloned().collect::<Vec<_>>().join(";");
                    writer.write_record([
                        entry.acronym,
                        status,
                        record.full(),
                        record.comment(),
                        record.source(),
                        tags.as_str(),
                        "",
                    ])?;
                }
            }
            Outcome::NotFound { suggestions } => {
                writer.write_record([
                    entry.acronym,
                    status,
                    "",
                    "",
                    "",
                    "",
                    suggestions.join(";").as_str(),
                ])?;
            }
        }
        Ok(())
    }

    fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e))?;
        Ok(String::from_utf8(bytes)?)
    }
}

impl OutputFormatter for CsvFormatter {
    fn format_single(&self, entry: &LookupEntry<'_>) -> Result<String> {
        self.format_batch(std::slice::from_ref(entry))
    }

    fn format_batch(&self, entries: &[LookupEntry<'_>]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.write_record(Self::HEADER)?;
        for entry in entries {
            Self::write_rows(&mut writer, entry)?;
        }
        Self::finish(writer)
    }
}
