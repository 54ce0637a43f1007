//! Decronym Core Library
//!
//! Resolves acronyms to their definitions by querying a set of providers
//! (local definition files, remote feeds, scraped pages), each behind its own
//! persistent cache, and merging the results.

pub mod aggregator;
pub mod cache;
pub mod credentials;
pub mod definitions;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod provider;
pub mod record;
pub mod settings;
pub mod similarity;
pub mod transport;

// Re-export main types
pub use aggregator::{Aggregator, Outcome, UpdateReport};
pub use cache::{CacheStore, cache_path_for, clear_cache_dir};
pub use credentials::{CredentialSource, Credentials, NoCredentials, SecureString, StaticCredentials};
pub use descriptor::{ProviderDescriptor, ProviderKind, RawDescriptor, SourceList};
pub use error::{Error, Result};
pub use factory::ProviderFactory;
pub use provider::{CachedProvider, FindHit, Provider, ProviderStatus};
pub use record::{Record, fold_key, is_valid_acronym};
pub use settings::{LookupSettings, SuggestionConfig, TagMap};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
