//! Find command orchestrator

use super::build_aggregator;
use crate::config::AppConfig;
use crate::error::CliError;
use crate::output::{LookupEntry, OutputFormat, create_formatter};
use anyhow::Result;
use decronym_core::{Aggregator, CredentialSource, HttpTransport, Outcome, is_valid_acronym};
use log::{debug, warn};
use std::sync::Arc;

/// Options for one `find` invocation
#[derive(Debug, Clone)]
pub struct FindOptions {
    pub tags: Vec<String>,
    pub format: OutputFormat,
    pub use_color: bool,
}

/// Rendered output plus counts for the exit status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindSummary {
    pub output: String,
    pub matched: usize,
    pub filtered: usize,
    pub not_found: usize,
}

/// Orchestrator for the find command
pub struct FindOrchestrator {
    aggregator: Aggregator,
}

impl FindOrchestrator {
    pub fn new(
        config: &AppConfig,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            aggregator: build_aggregator(config, transport, credentials),
        }
    }

    /// Look up `acronyms`, apply the tag filter and format the outcome
    pub async fn run<S: AsRef<str>>(
        &mut self,
        acronyms: &[S],
        options: &FindOptions,
    ) -> Result<FindSummary> {
        let (valid, invalid): (Vec<&str>, Vec<&str>) = acronyms
            .iter()
            .map(AsRef::as_ref)
            .partition(|a| is_valid_acronym(a));
        for acronym in &invalid {
            warn!("Ignoring invalid acronym '{acronym}'");
        }
        if valid.is_empty() {
            return Err(CliError::misuse(&format!(
                "No valid acronyms given: {}",
                invalid.join(", ")
            ))
            .into());
        }

        if self.aggregator.providers().is_empty() {
            warn!("No sources configured; add one with 'decronym sources add'");
        }

        debug!("Looking up {} acronyms", valid.len());
        self.aggregator.request(&valid).await;
        if !options.tags.is_empty() {
            self.aggregator.filter_by_tags(&options.tags);
        }

        let entries: Vec<LookupEntry<'_>> = self
            .aggregator
            .requested()
            .iter()
            .map(|acronym| LookupEntry {
                acronym,
                outcome: self.aggregator.outcome(acronym),
            })
            .collect();

        let mut summary = FindSummary {
            output: create_formatter(options.format, options.use_color).format_batch(&entries)?,
            matched: 0,
            filtered: 0,
            not_found: 0,
        };
        for entry in &entries {
            match entry.outcome {
                Outcome::Matched(_) => summary.matched += 1,
                Outcome::Filtered(_) => summary.filtered += 1,
                Outcome::NotFound { .. } => summary.not_found += 1,
            }
        }

        Ok(summary)
    }
}
