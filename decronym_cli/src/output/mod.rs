mod formatters;

pub use formatters::{CsvFormatter, JsonFormatter, TextFormatter};

use anyhow::Result;
use decronym_core::Outcome;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    /// Parse output format from string
    pub fn from_string(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => anyhow::bail!("Unknown output format: {}", s),
        }
    }
}

/// One requested acronym and where it ended up
#[derive(Debug, Clone, Copy)]
pub struct LookupEntry<'a> {
    pub acronym: &'a str,
    pub outcome: Outcome<'a>,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Format a single acronym's outcome
    fn format_single(&self, entry: &LookupEntry<'_>) -> Result<String>;

    /// Format a whole batch, in request order
    fn format_batch(&self, entries: &[LookupEntry<'_>]) -> Result<String> {
        let formatted: Result<Vec<String>> =
            entries.iter().map(|e| self.format_single(e)).collect();

        Ok(formatted?.join("\n"))
    }
}

/// Create a formatter based on output format
pub fn create_formatter(format: OutputFormat, use_color: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(use_color)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Csv => Box::new(CsvFormatter::new()),
    }
}
