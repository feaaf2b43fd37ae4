//! Format-agnostic configuration loading and saving

use crate::{Error, Result, io};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

/// Format-agnostic configuration store.
///
/// Detects the format from the file extension and handles
/// serialization/deserialization transparently.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    /// Create a new ConfigStore.
    pub fn new() -> Self {
        Self
    }

    /// Load a value from a file.
    ///
    /// Format is detected from file extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = io::read_text(path)?;
        self.parse(path, &content)
    }

    /// Load a value, returning `None` when the file does not exist.
    pub fn load_opt<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        match io::read_text_opt(path)? {
            Some(content) => self.parse(path, &content).map(Some),
            None => Ok(None),
        }
    }

    fn parse<T: DeserializeOwned>(&self, path: &Path, content: &str) -> Result<T> {
        let parse_err = |format: &str, message: String| Error::ConfigParse {
            path: path.to_path_buf(),
            format: format.into(),
            message,
        };

        match extension(path).as_str() {
            "toml" => toml::from_str(content).map_err(|e| parse_err("TOML", e.to_string())),
            "json" => {
                serde_json::from_str(content).map_err(|e| parse_err("JSON", e.to_string()))
            }
            "yaml" | "yml" => {
                serde_yaml::from_str(content).map_err(|e| parse_err("YAML", e.to_string()))
            }
            other => Err(Error::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }

    /// Save a value to a file.
    ///
    /// Format is determined from file extension. JSON is written compactly
    /// when `pretty` is false.
    pub fn save<T: Serialize>(&self, path: &Path, value: &T, pretty: bool) -> Result<()> {
        let ser_err = |format: &str, message: String| Error::ConfigSerialize {
            path: path.to_path_buf(),
            format: format.into(),
            message,
        };

        let content = match extension(path).as_str() {
            "toml" => toml::to_string_pretty(value).map_err(|e| ser_err("TOML", e.to_string()))?,
            "json" if pretty => serde_json::to_string_pretty(value)
                .map_err(|e| ser_err("JSON", e.to_string()))?,
            "json" => serde_json::to_string(value).map_err(|e| ser_err("JSON", e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::to_string(value).map_err(|e| ser_err("YAML", e.to_string()))?
            }
            other => {
                return Err(Error::UnsupportedFormat {
                    extension: other.to_string(),
                });
            }
        };

        if path.exists() {
            tracing::debug!(path = %path.display(), "overwriting existing file");
        }
        io::write_atomic(path, content.as_bytes())
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
