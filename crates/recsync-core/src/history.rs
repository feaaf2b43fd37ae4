//! Change history: content digests of what was last pushed
//!
//! A record is pushed again only when its digest differs from the stored
//! one. The history is loaded once per run, mutated in memory through
//! [`HistoryStore::commit`], and written back wholesale on
//! [`HistoryStore::flush`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use recsync_connectors::Record;
use recsync_fs::{checksum, io};
use serde::{Deserialize, Serialize};

use crate::config::Target;
use crate::{Error, Result};

/// Target name to (identifier to digest)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashHistory(BTreeMap<String, BTreeMap<String, String>>);

impl HashHistory {
    pub fn get(&self, target: Target, ident: &str) -> Option<&str> {
        self.0
            .get(target.as_str())
            .and_then(|digests| digests.get(ident))
            .map(String::as_str)
    }

    pub fn len(&self, target: Target) -> usize {
        self.0.get(target.as_str()).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }

    fn insert(&mut self, target: Target, ident: String, digest: String) -> bool {
        let digests = self.0.entry(target.as_str().to_string()).or_default();
        digests.insert(ident, digest.clone()).as_deref() != Some(digest.as_str())
    }
}

/// Stringified identifier of `record`, if it has one.
pub fn ident_key(record: &Record, ident: &str) -> Option<String> {
    record.get(ident).map(ToString::to_string)
}

/// SHA-256 over the record without its identifier.
///
/// Values are stringified and serialized as a JSON object with sorted keys,
/// so neither column order nor value types beyond their text form matter.
pub fn record_digest(record: &Record, ident: &str) -> String {
    let canonical: BTreeMap<&str, String> = record
        .iter()
        .filter(|(column, _)| column.as_str() != ident)
        .map(|(column, value)| (column.as_str(), value.to_string()))
        .collect();
    // A map of strings always serializes
    let json = serde_json::to_string(&canonical).unwrap_or_default();
    checksum::content_digest(&json)
}

/// History bound to its backing file, if any.
#[derive(Debug)]
pub struct HistoryStore {
    path: Option<PathBuf>,
    history: HashHistory,
    dirty: bool,
}

impl HistoryStore {
    /// Load from `path`; a missing file means a first run.
    pub fn load(path: &Path) -> Result<Self> {
        let history = match io::read_text_opt(path)? {
            Some(text) if !text.trim().is_empty() => {
                serde_json::from_str(&text).map_err(|e| {
                    Error::configuration(format!(
                        "history file {} is corrupt: {e}",
                        path.display()
                    ))
                })?
            }
            _ => HashHistory::default(),
        };
        tracing::debug!(path = %path.display(), "loaded change history");
        Ok(Self {
            path: Some(path.to_path_buf()),
            history,
            dirty: false,
        })
    }

    /// History that never touches disk
    pub fn in_memory() -> Self {
        Self::from_history(HashHistory::default())
    }

    pub fn from_history(history: HashHistory) -> Self {
        Self {
            path: None,
            history,
            dirty: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn history(&self) -> &HashHistory {
        &self.history
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Records whose digest is absent or differs from the stored one.
    ///
    /// Lazy and order-preserving. Records without an identifier are always
    /// emitted.
    pub fn classify<'a, I>(
        &'a self,
        target: Target,
        records: I,
        ident: &'a str,
    ) -> impl Iterator<Item = Record> + 'a
    where
        I: IntoIterator<Item = Record>,
        I::IntoIter: 'a,
    {
        records.into_iter().filter(move |record| {
            let Some(key) = ident_key(record, ident) else {
                return true;
            };
            self.history.get(target, &key) != Some(record_digest(record, ident).as_str())
        })
    }

    /// Store the digest of `record` as its last pushed state.
    pub fn commit(&mut self, target: Target, record: &Record, ident: &str) -> Result<()> {
        let key = ident_key(record, ident).ok_or_else(|| Error::MissingIdent {
            ident: ident.to_string(),
        })?;
        if self
            .history
            .insert(target, key, record_digest(record, ident))
        {
            self.dirty = true;
        }
        Ok(())
    }

    /// Write the whole history to its file. In-memory stores only reset
    /// the dirty flag.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(path) = &self.path {
            let json = serde_json::to_string(&self.history)?;
            io::write_atomic(path, json.as_bytes())?;
            tracing::debug!(path = %path.display(), "flushed change history");
        }
        self.dirty = false;
        Ok(())
    }

    pub fn flush_if_dirty(&mut self) -> Result<()> {
        if self.dirty { self.flush() } else { Ok(()) }
    }
}
