use crate::paths;
use anyhow::{Context, Result};
use decronym_core::{
    LookupSettings, ProviderDescriptor, ProviderKind, RawDescriptor, SourceList, SuggestionConfig,
    TagMap,
};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Public sources written by `config init`, disabled until the user opts in
const DEFAULT_SOURCES: [(ProviderKind, &str); 3] = [
    (
        ProviderKind::TimeDate,
        "https://www.timeanddate.com/time/zones/",
    ),
    (
        ProviderKind::IsoCurrency,
        "https://www.six-group.com/dam/download/financial-information/data-center/iso-currrency/lists/list-one.xml",
    ),
    (ProviderKind::Wikipedia, "https://en.wikipedia.org/wiki/"),
];

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub tag_map: TagMap,

    #[serde(default)]
    pub sources: Vec<RawDescriptor>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LookupConfig {
    pub concurrency: usize,
    pub suggestions: bool,
    pub max_suggestions: usize,
    pub similarity_cutoff: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NetworkConfig {
    pub timeout_seconds: u64,
    pub probe_timeout_ms: u64,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct CacheConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub default_format: String,
    pub color_enabled: bool,
    pub progress_enabled: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        let suggestions = SuggestionConfig::default();
        Self {
            concurrency: decronym_core::settings::DEFAULT_CONCURRENCY,
            suggestions: suggestions.enabled,
            max_suggestions: suggestions.limit,
            similarity_cutoff: suggestions.cutoff,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: decronym_core::settings::DEFAULT_FETCH_TIMEOUT.as_secs(),
            probe_timeout_ms: decronym_core::settings::DEFAULT_PROBE_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: "text".to_string(),
            color_enabled: true,
            progress_enabled: true,
        }
    }
}

impl AppConfig {
    /// Cache directory, from configuration or the platform default
    pub fn cache_dir(&self) -> PathBuf {
        self.cache
            .dir
            .clone()
            .unwrap_or_else(paths::get_cache_dir)
    }

    /// Settings handed to the lookup core
    pub fn lookup_settings(&self) -> LookupSettings {
        LookupSettings::new(self.cache_dir())
            .with_fetch_timeout(Duration::from_secs(self.network.timeout_seconds))
            .with_probe_timeout(Duration::from_millis(self.network.probe_timeout_ms))
            .with_concurrency(self.lookup.concurrency)
            .with_suggestions(SuggestionConfig {
                enabled: self.lookup.suggestions,
                limit: self.lookup.max_suggestions,
                cutoff: self.lookup.similarity_cutoff,
            })
            .with_tag_map(self.tag_map.clone())
    }

    /// Validated sources; bad entries are logged and skipped
    pub fn source_list(&self) -> SourceList {
        let (list, errors) = SourceList::from_raw(self.sources.iter().cloned());
        for error in errors {
            log::warn!("Skipping source: {error}");
        }
        list
    }
}

/// Configuration manager that handles platform paths and layered configuration
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Create a new ConfigManager with the platform config path
    pub fn new() -> Self {
        Self {
            config_path: paths::get_config_path(),
        }
    }

    /// Create a ConfigManager with a specific path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn get_config_path(&self) -> PathBuf {
        self.config_path.clone()
    }

    /// Load configuration with layered priority: ENV > File > Defaults
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new();

        // Layer 1: Defaults
        figment = figment.merge(Serialized::defaults(AppConfig::default()));

        // Layer 2: Config file (if exists)
        if self.config_path.exists() {
            figment = figment.merge(Toml::file(&self.config_path));
        }

        // Layer 3: Environment variables
        figment = figment.merge(
            Env::prefixed("DECRONYM_")
                .ignore(&["username", "password"])
                .split("__"),
        );

        figment.extract().with_context(|| {
            format!(
                "Failed to load configuration from {}",
                self.config_path.display()
            )
        })
    }

    /// Write a complete configuration file with defaults
    ///
    /// Returns `false` without touching an existing file unless `force` is set.
    pub fn init(&self, force: bool) -> Result<bool> {
        if self.config_path.exists() && !force {
            return Ok(false);
        }

        let mut sources = SourceList::new();
        for (kind, location) in DEFAULT_SOURCES {
            sources.add(ProviderDescriptor::new(kind, location).with_enabled(false))?;
        }
        let config = AppConfig {
            sources: sources.to_raw(),
            ..AppConfig::default()
        };

        let document = toml::Value::try_from(&config).context("Failed to serialize defaults")?;
        self.write_document(&document)?;
        Ok(true)
    }

    /// Get a configuration value by key (dot notation)
    pub fn get(&self, key: &str) -> Result<String> {
        let value = self.effective_document()?;

        let mut current = &value;
        for part in key.split('.') {
            match current {
                toml::Value::Table(table) => {
                    current = table
                        .get(part)
                        .ok_or_else(|| anyhow::anyhow!("Key '{}' not found", key))?;
                }
                _ => anyhow::bail!("Invalid key path: {}", key),
            }
        }

        match current {
            toml::Value::String(s) => Ok(s.clone()),
            toml::Value::Integer(i) => Ok(i.to_string()),
            toml::Value::Float(f) => Ok(f.to_string()),
            toml::Value::Boolean(b) => Ok(b.to_string()),
            toml::Value::Array(items) => Ok(items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(",")),
            _ => anyhow::bail!("Value at '{}' is not a simple type", key),
        }
    }

    /// Set a configuration value by key (dot notation)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parsed_value = Self::parse_config_value(key, value)?;

        let parts: Vec<&str> = key.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            anyhow::bail!("Invalid key: '{}'", key);
        }
        if parts[0] == "sources" {
            anyhow::bail!("Sources are managed with 'decronym sources'");
        }

        let mut config = self.read_document()?;
        let (last, parents) = parts
            .split_last()
            .ok_or_else(|| anyhow::anyhow!("Empty key"))?;

        let mut current = &mut config;
        for part in parents {
            let toml::Value::Table(table) = current else {
                anyhow::bail!("Invalid key path: expected table at '{}'", part);
            };
            current = table
                .entry(part.to_string())
                .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
        }
        let toml::Value::Table(table) = current else {
            anyhow::bail!("Cannot set value on non-table");
        };
        table.insert(last.to_string(), parsed_value);

        self.write_document(&config)
    }

    /// List all scalar configuration values
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let value = self.effective_document()?;

        let mut items = Vec::new();
        Self::collect_values(&value, String::new(), &mut items);
        items.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(items)
    }

    /// Sources as written in the configuration file
    pub fn sources(&self) -> Result<SourceList> {
        let document = self.read_document()?;
        let raw = Self::raw_sources(&document)?;
        let (list, errors) = SourceList::from_raw(raw);
        if let Some(error) = errors.into_iter().next() {
            anyhow::bail!(
                "Invalid source in {}: {}",
                self.config_path.display(),
                error
            );
        }
        Ok(list)
    }

    /// Append a source, rejecting a repeated `(type, location)` pair
    pub fn add_source(&mut self, descriptor: ProviderDescriptor) -> Result<()> {
        let mut sources = self.sources()?;
        sources.add(descriptor)?;
        self.write_sources(&sources)
    }

    /// Remove a source, returning whether it was configured
    pub fn remove_source(&mut self, kind: ProviderKind, location: &str) -> Result<bool> {
        let mut sources = self.sources()?;
        if sources.remove(kind, location).is_none() {
            return Ok(false);
        }
        self.write_sources(&sources)?;
        Ok(true)
    }

    pub fn set_source_enabled(
        &mut self,
        kind: ProviderKind,
        location: &str,
        enabled: bool,
    ) -> Result<()> {
        let mut sources = self.sources()?;
        sources.set_enabled(kind, location, enabled)?;
        self.write_sources(&sources)
    }

    fn write_sources(&self, sources: &SourceList) -> Result<()> {
        let mut document = self.read_document()?;
        let raw = toml::Value::try_from(sources.to_raw()).context("Failed to serialize sources")?;
        if let toml::Value::Table(table) = &mut document {
            table.insert("sources".to_string(), raw);
        }
        self.write_document(&document)
    }

    fn raw_sources(document: &toml::Value) -> Result<Vec<RawDescriptor>> {
        match document.get("sources") {
            Some(value) => value
                .clone()
                .try_into()
                .context("'sources' must be an array of tables"),
            None => Ok(Vec::new()),
        }
    }

    /// The configuration file alone, or an empty table when absent
    fn read_document(&self) -> Result<toml::Value> {
        if !self.config_path.exists() {
            return Ok(toml::Value::Table(toml::map::Map::new()));
        }
        let content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read {}", self.config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.config_path.display()))
    }

    fn write_document(&self, document: &toml::Value) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_string = toml::to_string_pretty(document)?;
        fs::write(&self.config_path, toml_string)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))
    }

    /// All layers merged, as a TOML tree
    fn effective_document(&self) -> Result<toml::Value> {
        let config = self.load()?;
        toml::Value::try_from(&config).context("Failed to serialize configuration")
    }

    /// Recursively collect all key-value pairs from TOML
    fn collect_values(value: &toml::Value, prefix: String, items: &mut Vec<(String, String)>) {
        match value {
            toml::Value::Table(table) => {
                for (key, val) in table {
                    let new_prefix = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    Self::collect_values(val, new_prefix, items);
                }
            }
            toml::Value::String(s) => items.push((prefix, s.clone())),
            toml::Value::Integer(i) => items.push((prefix, i.to_string())),
            toml::Value::Float(f) => items.push((prefix, f.to_string())),
            toml::Value::Boolean(b) => items.push((prefix, b.to_string())),
            _ => {} // Sources and keyword lists have their own commands
        }
    }

    /// Validate a value and convert it to the TOML type its key expects
    fn parse_config_value(key: &str, value: &str) -> Result<toml::Value> {
        match key {
            "lookup.concurrency" => {
                let n: i64 = value
                    .parse()
                    .context("concurrency must be a positive integer")?;
                if n < 1 {
                    anyhow::bail!("concurrency must be at least 1");
                }
                Ok(toml::Value::Integer(n))
            }
            "lookup.max_suggestions" | "network.probe_timeout_ms" => {
                let n: u32 = value
                    .parse()
                    .with_context(|| format!("{key} must be a non-negative integer"))?;
                Ok(toml::Value::Integer(n.into()))
            }
            "network.timeout_seconds" => {
                let timeout: i64 = value
                    .parse()
                    .context("timeout_seconds must be a positive integer")?;
                if timeout <= 0 {
                    anyhow::bail!("timeout_seconds must be greater than 0");
                }
                Ok(toml::Value::Integer(timeout))
            }
            "lookup.similarity_cutoff" => {
                let cutoff: f64 = value
                    .parse()
                    .context("similarity_cutoff must be a number")?;
                if !(0.0..=1.0).contains(&cutoff) {
                    anyhow::bail!("similarity_cutoff must be between 0.0 and 1.0");
                }
                Ok(toml::Value::Float(cutoff))
            }
            "lookup.suggestions" | "output.color_enabled" | "output.progress_enabled" => {
                let enabled: bool = value.parse().context("Value must be 'true' or 'false'")?;
                Ok(toml::Value::Boolean(enabled))
            }
            "output.default_format" => {
                if crate::output::OutputFormat::from_string(value).is_err() {
                    anyhow::bail!("default_format must be one of: text, json, csv");
                }
                Ok(toml::Value::String(value.to_lowercase()))
            }
            "cache.dir" => Ok(toml::Value::String(value.to_string())),
            k if k.starts_with("tag_map.") => Ok(toml::Value::Array(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| toml::Value::String(s.to_string()))
                    .collect(),
            )),
            _ => Err(crate::error::CliError::unknown_value(
                "configuration key",
                key,
                &KNOWN_KEYS,
            )
            .into()),
        }
    }
}

/// Scalar keys accepted by `config set`, besides `tag_map.<tag>`
pub const KNOWN_KEYS: [&str; 10] = [
    "lookup.concurrency",
    "lookup.suggestions",
    "lookup.max_suggestions",
    "lookup.similarity_cutoff",
    "network.timeout_seconds",
    "network.probe_timeout_ms",
    "cache.dir",
    "output.default_format",
    "output.color_enabled",
    "output.progress_enabled",
];

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> ConfigManager {
        ConfigManager::with_path(dir.path().join("config.toml"))
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = manager(&dir).load().unwrap();

        assert_eq!(config.lookup.concurrency, 8);
        assert_eq!(config.lookup.max_suggestions, 3);
        assert_eq!(config.network.timeout_seconds, 10);
        assert_eq!(config.network.probe_timeout_ms, 400);
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_lookup_settings_follow_config() {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.cache.dir = Some(dir.path().to_path_buf());
        config.lookup.suggestions = false;
        config.network.timeout_seconds = 3;

        let settings = config.lookup_settings();
        assert_eq!(settings.cache_dir, dir.path());
        assert!(!settings.suggestions.enabled);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_set_validates_values() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);

        assert!(manager.set("lookup.concurrency", "0").is_err());
        assert!(manager.set("lookup.similarity_cutoff", "1.5").is_err());
        assert!(manager.set("output.default_format", "yaml").is_err());
        assert!(manager.set("sources.0.type", "json_file").is_err());
        assert!(!manager.get_config_path().exists());
    }

    #[test]
    fn test_unknown_key_suggests_known_one() {
        let dir = TempDir::new().unwrap();
        let error = manager(&dir).set("lookup.concurency", "4").unwrap_err();
        let cli_error = crate::error::CliError::from(error);
        assert_eq!(
            cli_error.suggestions[0],
            "Did you mean 'lookup.concurrency'?"
        );
    }

    #[test]
    fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);

        manager.set("lookup.max_suggestions", "5").unwrap();
        manager.set("tag_map.medical", "medicine, disease").unwrap();

        assert_eq!(manager.get("lookup.max_suggestions").unwrap(), "5");
        assert_eq!(manager.get("tag_map.medical").unwrap(), "medicine,disease");
        let config = manager.load().unwrap();
        assert_eq!(config.tag_map.tags_for("a rare disease").len(), 1);
    }

    #[test]
    fn test_init_writes_disabled_public_sources() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);

        assert!(manager.init(false).unwrap());
        assert!(!manager.init(false).unwrap());

        let sources = manager.sources().unwrap();
        assert_eq!(sources.len(), 3);
        assert!(sources.iter().all(|d| !d.enabled));
        assert_eq!(manager.get("lookup.concurrency").unwrap(), "8");
    }

    #[test]
    fn test_source_editing_rejects_duplicates() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        let descriptor = ProviderDescriptor::new(ProviderKind::JsonPath, "/srv/glossaries");

        manager.add_source(descriptor.clone()).unwrap();
        assert!(manager.add_source(descriptor).is_err());

        manager
            .set_source_enabled(ProviderKind::JsonPath, "/srv/glossaries", false)
            .unwrap();
        assert!(!manager.sources().unwrap().iter().next().unwrap().enabled);

        assert!(
            manager
                .remove_source(ProviderKind::JsonPath, "/srv/glossaries")
                .unwrap()
        );
        assert!(
            !manager
                .remove_source(ProviderKind::JsonPath, "/srv/glossaries")
                .unwrap()
        );
    }

    #[test]
    fn test_source_extra_survives_rewrite() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir);
        manager
            .add_source(
                ProviderDescriptor::new(ProviderKind::ConfluenceTable, "https://wiki.example.com")
                    .with_extra("page_id", "4242"),
            )
            .unwrap();
        manager.set("lookup.suggestions", "false").unwrap();

        let config = manager.load().unwrap();
        let sources = config.source_list();
        let confluence = sources.iter().next().unwrap();
        assert_eq!(confluence.extra_str("page_id").as_deref(), Some("4242"));
        assert!(!config.lookup.suggestions);
    }

    #[test]
    fn test_unparsable_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);
        fs::write(manager.get_config_path(), "[lookup\nconcurrency = ").unwrap();

        assert!(manager.load().is_err());
    }
}
