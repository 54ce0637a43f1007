//! Provider descriptors
//!
//! A descriptor names a provider variant and where it reads from. Raw
//! descriptors come straight from configuration. They are turned into typed
//! [`ProviderDescriptor`]s before anything is built from them, so an unknown
//! `type` string is reported instead of silently ignored.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of provider variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderKind {
    /// Single local definitions file
    JsonFile,
    /// Directory tree of definitions files
    JsonPath,
    /// Remote definitions feed
    JsonUrl,
    /// Time zone abbreviation pages
    TimeDate,
    /// ISO 4217 currency list
    IsoCurrency,
    /// Three-column table on an authenticated wiki page
    ConfluenceTable,
    /// Encyclopedia article and disambiguation pages
    Wikipedia,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 7] = [
        Self::JsonFile,
        Self::JsonPath,
        Self::JsonUrl,
        Self::TimeDate,
        Self::IsoCurrency,
        Self::ConfluenceTable,
        Self::Wikipedia,
    ];

    /// Configuration spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JsonFile => "json_file",
            Self::JsonPath => "json_path",
            Self::JsonUrl => "json_url",
            Self::TimeDate => "timedate",
            Self::IsoCurrency => "iso_currency",
            Self::ConfluenceTable => "confluence_table",
            Self::Wikipedia => "wikipedia",
        }
    }

    /// Parse a configuration `type` string
    ///
    /// `path` is accepted as an older spelling of `json_path`.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json_file" => Ok(Self::JsonFile),
            "json_path" | "path" => Ok(Self::JsonPath),
            "json_url" => Ok(Self::JsonUrl),
            "timedate" => Ok(Self::TimeDate),
            "iso_currency" => Ok(Self::IsoCurrency),
            "confluence_table" => Ok(Self::ConfluenceTable),
            "wikipedia" => Ok(Self::Wikipedia),
            _ => Err(ConfigError::unknown_type(value)),
        }
    }

    /// Whether the variant reads from a local file or directory
    pub fn is_local(&self) -> bool {
        matches!(self, Self::JsonFile | Self::JsonPath)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor exactly as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(alias = "source")]
    pub location: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_enabled() -> bool {
    true
}

/// Validated descriptor for one provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDescriptor {
    pub kind: ProviderKind,
    pub location: String,
    pub enabled: bool,
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ProviderDescriptor {
    pub fn new(kind: ProviderKind, location: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.into(),
            enabled: true,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Scalar `extra` parameter as text
    ///
    /// Numbers are accepted as well since page ids are often written
    /// unquoted.
    pub fn extra_str(&self, key: &str) -> Option<String> {
        match self.extra.get(key)? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Like [`extra_str`](Self::extra_str) but reports a missing parameter
    pub fn require_extra(&self, key: &str) -> Result<String, ConfigError> {
        self.extra_str(key)
            .ok_or_else(|| ConfigError::missing_extra(self.kind.as_str(), key))
    }

    /// Whether both descriptors name the same `(type, location)` pair
    pub fn same_source(&self, other: &Self) -> bool {
        self.kind == other.kind && self.location == other.location
    }
}

impl TryFrom<RawDescriptor> for ProviderDescriptor {
    type Error = ConfigError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        let kind = ProviderKind::parse(&raw.kind)?;
        let location = raw.location.trim().to_string();
        if location.is_empty() {
            return Err(ConfigError::invalid_descriptor(format!(
                "source '{kind}' has an empty location"
            )));
        }

        Ok(Self {
            kind,
            location,
            enabled: raw.enabled,
            extra: raw.extra,
        })
    }
}

impl From<&ProviderDescriptor> for RawDescriptor {
    fn from(descriptor: &ProviderDescriptor) -> Self {
        Self {
            kind: descriptor.kind.as_str().to_string(),
            location: descriptor.location.clone(),
            enabled: descriptor.enabled,
            extra: descriptor.extra.clone(),
        }
    }
}

impl fmt::Display for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.location)
    }
}

/// Ordered collection of descriptors without duplicate `(type, location)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceList {
    descriptors: Vec<ProviderDescriptor>,
}

impl SourceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw configuration entries
    ///
    /// Entries that fail to parse or repeat an earlier pair are returned as
    /// errors alongside the list instead of failing the whole load.
    pub fn from_raw<I>(raw: I) -> (Self, Vec<ConfigError>)
    where
        I: IntoIterator<Item = RawDescriptor>,
    {
        let mut list = Self::new();
        let mut errors = Vec::new();
        for entry in raw {
            let result = ProviderDescriptor::try_from(entry).and_then(|d| list.add(d));
            if let Err(e) = result {
                errors.push(e);
            }
        }
        (list, errors)
    }

    /// Append a descriptor, rejecting a repeated `(type, location)` pair
    pub fn add(&mut self, descriptor: ProviderDescriptor) -> Result<(), ConfigError> {
        if self.descriptors.iter().any(|d| d.same_source(&descriptor)) {
            return Err(ConfigError::duplicate(
                descriptor.kind.as_str(),
                &descriptor.location,
            ));
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Remove and return the descriptor for `(kind, location)`
    pub fn remove(&mut self, kind: ProviderKind, location: &str) -> Option<ProviderDescriptor> {
        let index = self
            .descriptors
            .iter()
            .position(|d| d.kind == kind && d.location == location)?;
        Some(self.descriptors.remove(index))
    }

    /// Enable or disable the descriptor for `(kind, location)`
    pub fn set_enabled(
        &mut self,
        kind: ProviderKind,
        location: &str,
        enabled: bool,
    ) -> Result<(), ConfigError> {
        let descriptor = self
            .descriptors
            .iter_mut()
            .find(|d| d.kind == kind && d.location == location)
            .ok_or_else(|| {
                ConfigError::invalid_descriptor(format!(
                    "source '{kind}' at '{location}' is not configured"
                ))
            })?;
        descriptor.enabled = enabled;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Raw form for writing back to configuration
    pub fn to_raw(&self) -> Vec<RawDescriptor> {
        self.descriptors.iter().map(RawDescriptor::from).collect()
    }
}

impl IntoIterator for SourceList {
    type Item = ProviderDescriptor;
    type IntoIter = std::vec::IntoIter<ProviderDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(kind: &str, location: &str) -> RawDescriptor {
        RawDescriptor {
            kind: kind.to_string(),
            location: location.to_string(),
            enabled: true,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_kind_round_trips_through_its_name() {
        for kind in ProviderKind::ALL {
            assert_eq!(ProviderKind::parse(kind.as_str()).unwrap(), kind);
        }
        assert_eq!(ProviderKind::parse("path").unwrap(), ProviderKind::JsonPath);
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(
            ProviderKind::parse("ldap").unwrap_err(),
            ConfigError::UnknownProviderType {
                kind: "ldap".to_string()
            }
        );
    }

    #[test]
    fn test_raw_descriptor_accepts_source_alias() {
        let raw: RawDescriptor = serde_json::from_str(
            r#"{"type": "json_file", "source": "/defs/a.json", "enabled": false}"#,
        )
        .unwrap();
        assert_eq!(raw.location, "/defs/a.json");
        assert!(!raw.enabled);

        let raw: RawDescriptor =
            serde_json::from_str(r#"{"type": "json_url", "location": "https://x/y.json"}"#)
                .unwrap();
        assert!(raw.enabled);
    }

    #[test]
    fn test_empty_location_rejected() {
        let err = ProviderDescriptor::try_from(raw("json_file", "  ")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_extra_accepts_numbers() {
        let descriptor = ProviderDescriptor::new(ProviderKind::ConfluenceTable, "https://wiki")
            .with_extra("page_id", 12345);
        assert_eq!(descriptor.require_extra("page_id").unwrap(), "12345");
        assert!(matches!(
            descriptor.require_extra("space"),
            Err(ConfigError::MissingExtra { .. })
        ));
    }

    #[test]
    fn test_source_list_rejects_duplicates() {
        let mut list = SourceList::new();
        list.add(ProviderDescriptor::new(ProviderKind::JsonFile, "/a.json"))
            .unwrap();
        list.add(ProviderDescriptor::new(ProviderKind::JsonPath, "/a.json"))
            .unwrap();

        let err = list
            .add(ProviderDescriptor::new(ProviderKind::JsonFile, "/a.json"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateProvider { .. }));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_source_list_from_raw_collects_errors() {
        let (list, errors) = SourceList::from_raw([
            raw("json_file", "/a.json"),
            raw("gopher", "gopher://x"),
            raw("json_file", "/a.json"),
            raw("wikipedia", "https://en.wikipedia.org/wiki/"),
        ]);

        assert_eq!(list.len(), 2);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ConfigError::UnknownProviderType { .. }));
        assert!(matches!(errors[1], ConfigError::DuplicateProvider { .. }));
    }

    #[test]
    fn test_source_list_enable_and_remove() {
        let mut list = SourceList::new();
        list.add(ProviderDescriptor::new(ProviderKind::JsonFile, "/a.json"))
            .unwrap();

        list.set_enabled(ProviderKind::JsonFile, "/a.json", false)
            .unwrap();
        assert!(!list.iter().next().unwrap().enabled);
        assert!(
            list.set_enabled(ProviderKind::JsonUrl, "/a.json", true)
                .is_err()
        );

        assert!(list.remove(ProviderKind::JsonFile, "/a.json").is_some());
        assert!(list.is_empty());
    }
}
