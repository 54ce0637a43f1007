//! Command orchestrators
//!
//! Orchestrators turn loaded configuration into core objects, run one
//! command against them and hand back something printable.

pub mod find_orchestrator;
pub mod update_orchestrator;

pub use find_orchestrator::{FindOptions, FindOrchestrator, FindSummary};
pub use update_orchestrator::UpdateOrchestrator;

use crate::config::AppConfig;
use decronym_core::{Aggregator, CredentialSource, HttpTransport, ProviderFactory};
use log::debug;
use std::sync::Arc;

/// Build an aggregator over every configured source
pub(crate) fn build_aggregator(
    config: &AppConfig,
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialSource>,
) -> Aggregator {
    let settings = config.lookup_settings();
    let concurrency = settings.concurrency;
    debug!(
        "Building providers with cache dir {}",
        settings.cache_dir.display()
    );

    let factory = ProviderFactory::new(settings, transport, credentials);
    let providers = factory.from_descriptors(config.source_list());
    debug!("{} providers ready", providers.len());

    Aggregator::new(providers).with_concurrency(concurrency)
}
