//! Sync configuration: remote endpoint, per-target connection structures and
//! field mappings
//!
//! Stored as JSON in the state directory by default; any format
//! [`ConfigStore`] understands works when a path is given explicitly.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use recsync_connectors::{CollectionInfo, ConnectionParams, ConnectionType};
use recsync_fs::ConfigStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::report::Severity;
use crate::template::Template;
use crate::{Error, Result};

/// Base URL used when the configured domain is `local`
pub const LOCAL_BASE_URL: &str = "http://127.0.0.1:8000";

/// Destination record type on the remote side.
///
/// Targets are always processed in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Asset,
    Project,
}

impl Target {
    pub const ALL: [Target; 2] = [Target::Asset, Target::Project];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Project => "project",
        }
    }

    /// Remote collection endpoint whose `OPTIONS` describe the target schema
    pub fn collection_path(&self) -> &'static str {
        match self {
            Self::Asset => "node/asset/",
            Self::Project => "project/project/",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown target '{s}' (expected asset or project)"))
    }
}

/// Mapping rule for one destination field.
///
/// Mirrors the remote schema entry, so unrelated keys such as `label` or
/// `read_only` are accepted and ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Format template, or null to leave the field unset
    #[serde(default)]
    pub src: Option<Value>,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<Value>,
}

fn default_field_type() -> String {
    "string".to_string()
}

impl FieldRule {
    /// A text field rendered from `template`
    pub fn text(template: impl Into<String>) -> Self {
        Self {
            src: Some(Value::String(template.into())),
            field_type: default_field_type(),
            required: false,
            max_length: None,
        }
    }

    /// An integer field rendered from `template`
    pub fn integer(template: impl Into<String>) -> Self {
        Self {
            field_type: "integer".to_string(),
            ..Self::text(template)
        }
    }

    pub fn with_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = field_type.into();
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(Value::from(max_length));
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The parsed source template; `None` when the field stays unset.
    ///
    /// Any literal other than a string is rejected.
    pub fn template(&self, field: &str) -> Result<Option<Template>> {
        match &self.src {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(src)) => Template::parse(src).map(Some).map_err(|e| {
                Error::configuration(format!("field '{field}': {e}"))
            }),
            Some(other) => Err(Error::configuration(format!(
                "field '{field}': src must be a template string or null, got {other}"
            ))),
        }
    }

    pub fn max_length(&self, field: &str) -> Result<Option<usize>> {
        match &self.max_length {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| {
                    Error::configuration(format!(
                        "field '{field}': max_length must be a non-negative integer, got {n}"
                    ))
                }),
            Some(other) => Err(Error::configuration(format!(
                "field '{field}': max_length must be a number, got {other}"
            ))),
        }
    }

    /// Whether rendered values must become integers
    pub fn is_integer(&self) -> bool {
        matches!(self.field_type.as_str(), "field" | "int" | "integer")
    }
}

/// Destination field name to mapping rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(BTreeMap<String, FieldRule>);

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, rule: FieldRule) -> Self {
        self.0.insert(field.into(), rule);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, rule: FieldRule) {
        self.0.insert(field.into(), rule);
    }

    pub fn get(&self, field: &str) -> Option<&FieldRule> {
        self.0.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldRule)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check every rule and, unless a hardcoded query decides the
    /// projection, that templates only reference selected fields.
    pub fn validate(&self, collection: &CollectionInfo) -> Result<()> {
        for (field, rule) in &self.0 {
            rule.max_length(field)?;
            let Some(template) = rule.template(field)? else {
                continue;
            };
            if collection.hardcoded_query.is_some() {
                continue;
            }
            if let Some(unknown) = template
                .placeholders()
                .find(|name| !collection.fields.iter().any(|f| f == name))
            {
                return Err(Error::configuration(format!(
                    "field '{field}' references '{unknown}', which is not selected from '{}'",
                    collection.collection_name
                )));
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, FieldRule)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (String, FieldRule)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The configured `connection_type` of a target.
///
/// Names outside [`ConnectionType`] still load; resolving them fails, which
/// aborts only the target that carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceKind {
    Known(ConnectionType),
    Unknown(String),
}

impl SourceKind {
    /// The connection type, if the configured name is one.
    pub fn known(&self) -> Option<ConnectionType> {
        match self {
            Self::Known(t) => Some(*t),
            Self::Unknown(name) => name.parse().ok(),
        }
    }

    pub fn resolve(&self) -> Result<ConnectionType> {
        match self {
            Self::Known(t) => Ok(*t),
            Self::Unknown(name) => name.parse().map_err(Error::configuration),
        }
    }
}

impl From<ConnectionType> for SourceKind {
    fn from(connection_type: ConnectionType) -> Self {
        Self::Known(connection_type)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(t) => f.write_str(t.as_str()),
            Self::Unknown(name) => f.write_str(name),
        }
    }
}

/// Everything needed to sync one target from one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStructure {
    pub connection_type: SourceKind,
    pub connection_info: ConnectionParams,
    pub collection_info: CollectionInfo,
    #[serde(default)]
    pub field_mapping: FieldMapping,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

impl ConnectionStructure {
    pub fn new(
        connection_type: ConnectionType,
        connection_info: ConnectionParams,
        collection_info: CollectionInfo,
        field_mapping: FieldMapping,
    ) -> Self {
        Self {
            connection_type: connection_type.into(),
            connection_info,
            collection_info,
            field_mapping,
            encoding: default_encoding(),
        }
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.connection_type.resolve()?;
        self.collection_info
            .validate()
            .map_err(|e| Error::configuration(e.to_string()))?;
        self.field_mapping.validate(&self.collection_info)?;
        crate::transform::lookup_encoding(&self.encoding)?;
        Ok(())
    }
}

/// Remote API endpoint and credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// `local`, a full URL, or the complete host name of the API server
    /// (`sync.example.com`); no host name is derived from a short name.
    pub domain: String,
    pub api_key: String,
}

impl RemoteConfig {
    pub fn new(domain: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            api_key: api_key.into(),
        }
    }

    /// `local` means a development server; a full URL is taken as is;
    /// anything else is a host served over https.
    pub fn base_url(&self) -> String {
        let domain = self.domain.trim().trim_end_matches('/');
        if domain == "local" {
            LOCAL_BASE_URL.to_string()
        } else if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        }
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("domain", &self.domain)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Where run summaries go and from which severity on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_min_level")]
    pub min_level: Severity,
}

fn default_min_level() -> Severity {
    Severity::Info
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            min_level: default_min_level(),
        }
    }
}

/// The complete configuration of a sync installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub remote: RemoteConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<ConnectionStructure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ConnectionStructure>,
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl SyncConfig {
    pub fn new(remote: RemoteConfig) -> Self {
        Self {
            remote,
            asset: None,
            project: None,
            notify: NotifyConfig::default(),
        }
    }

    pub fn with_target(mut self, target: Target, structure: ConnectionStructure) -> Self {
        match target {
            Target::Asset => self.asset = Some(structure),
            Target::Project => self.project = Some(structure),
        }
        self
    }

    pub fn target(&self, target: Target) -> Option<&ConnectionStructure> {
        match target {
            Target::Asset => self.asset.as_ref(),
            Target::Project => self.project.as_ref(),
        }
    }

    /// Configured targets in processing order
    pub fn targets(&self) -> impl Iterator<Item = (Target, &ConnectionStructure)> {
        Target::ALL
            .into_iter()
            .filter_map(|t| self.target(t).map(|s| (t, s)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        Ok(ConfigStore::new().save(path, self, true)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.remote.domain.trim().is_empty() {
            return Err(Error::configuration("remote.domain is empty"));
        }
        for (target, structure) in self.targets() {
            structure
                .validate()
                .map_err(|e| Error::configuration(format!("{target}: {e}")))?;
        }
        Ok(())
    }
}
