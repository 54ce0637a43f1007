//! Update and clean command orchestrator

use super::build_aggregator;
use crate::config::AppConfig;
use anyhow::{Context, Result};
use colored::*;
use decronym_core::{
    Aggregator, CredentialSource, HttpTransport, ProviderStatus, UpdateReport, clear_cache_dir,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Orchestrator for cache maintenance
pub struct UpdateOrchestrator {
    aggregator: Aggregator,
    cache_dir: PathBuf,
}

impl UpdateOrchestrator {
    pub fn new(
        config: &AppConfig,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            aggregator: build_aggregator(config, transport, credentials),
            cache_dir: config.cache_dir(),
        }
    }

    /// Probe every enabled source and refresh whole-source caches
    pub async fn update(&self, show_progress: bool) -> Vec<UpdateReport> {
        let spinner = show_progress.then(|| {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
                spinner.set_style(style);
            }
            spinner.set_message(format!(
                "Updating {} sources",
                self.aggregator.providers().len()
            ));
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        });

        let reports = self.aggregator.update().await;

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        reports
    }

    /// Delete every cache file, returning how many were removed
    pub fn clean(&self) -> Result<usize> {
        debug!("Cleaning cache dir {}", self.cache_dir.display());
        clear_cache_dir(&self.cache_dir)
            .with_context(|| format!("Failed to clean {}", self.cache_dir.display()))
    }

    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }
}

/// One line per report, e.g. `✓ timedate https://... (cached 3)`
pub fn format_reports(reports: &[UpdateReport], use_color: bool) -> String {
    let mut output = String::new();
    for report in reports {
        let ok = report.alive && report.error.is_none();
        let marker = match (ok, use_color) {
            (true, true) => "✓".green().to_string(),
            (true, false) => "✓".to_string(),
            (false, true) => "✗".red().to_string(),
            (false, false) => "✗".to_string(),
        };

        let mut line = format!("{marker} {} {}", report.kind, report.provider);
        if report.refreshed > 0 {
            line.push_str(&format!(" (cached {})", report.refreshed));
        }
        if report.status == ProviderStatus::Invalid {
            line.push_str(" [invalid]");
        }
        if let Some(error) = &report.error {
            line.push_str(&format!(": {error}"));
        }
        output.push_str(&line);
        output.push('\n');
    }
    output
}
