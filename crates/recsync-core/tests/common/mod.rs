//! Shared fixtures for recsync-core integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;

use recsync_connectors::{CollectionInfo, ConnectionParams, ConnectionType};
use recsync_core::{
    ConnectionStructure, Error, FieldMapping, FieldRule, Payload, RemoteApi, Result, Target,
};
use recsync_test_utils::SqliteSource;
use serde_json::Value;

/// In-memory remote keyed by the payload's `external_id`.
#[derive(Default)]
pub struct MemoryRemote {
    records: RefCell<BTreeMap<Target, Vec<(String, Payload)>>>,
    pub bulk_calls: RefCell<usize>,
    pub update_calls: RefCell<usize>,
    pub reject_writes: bool,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_writes() -> Self {
        Self {
            reject_writes: true,
            ..Self::default()
        }
    }

    pub fn record(&self, target: Target, ident: &str) -> Option<Payload> {
        self.records
            .borrow()
            .get(&target)
            .and_then(|rows| rows.iter().find(|(k, _)| k == ident))
            .map(|(_, p)| p.clone())
    }

    pub fn len(&self, target: Target) -> usize {
        self.records.borrow().get(&target).map_or(0, Vec::len)
    }

    pub fn writes(&self) -> usize {
        *self.bulk_calls.borrow() + *self.update_calls.borrow()
    }

    fn key(payload: &Payload) -> String {
        match payload.get("external_id") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

impl RemoteApi for MemoryRemote {
    fn get_idents(&self, target: Target) -> Result<Vec<String>> {
        // Newest first
        Ok(self
            .records
            .borrow()
            .get(&target)
            .map(|rows| rows.iter().rev().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default())
    }

    fn bulk_create(&self, target: Target, payloads: &[Payload]) -> Result<()> {
        *self.bulk_calls.borrow_mut() += 1;
        if self.reject_writes {
            return Err(Error::connection("memory", "HTTP 500"));
        }
        let mut records = self.records.borrow_mut();
        let rows = records.entry(target).or_default();
        for payload in payloads {
            rows.push((Self::key(payload), payload.clone()));
        }
        Ok(())
    }

    fn update_by_ident(&self, target: Target, payload: &Payload) -> Result<()> {
        *self.update_calls.borrow_mut() += 1;
        if self.reject_writes {
            return Err(Error::connection("memory", "HTTP 500"));
        }
        let key = Self::key(payload);
        let mut records = self.records.borrow_mut();
        match records
            .get_mut(&target)
            .and_then(|rows| rows.iter_mut().find(|(k, _)| *k == key))
        {
            Some((_, existing)) => {
                *existing = payload.clone();
                Ok(())
            }
            None => Err(Error::connection("memory", format!("HTTP 404: {key}"))),
        }
    }

    fn field_schema(&self, _target: Target) -> Result<serde_json::Map<String, Value>> {
        Ok(serde_json::Map::new())
    }
}

/// Asset structure reading `assets(id, name)` from `source`
pub fn asset_structure(source: &SqliteSource) -> ConnectionStructure {
    ConnectionStructure::new(
        ConnectionType::Sqlite,
        ConnectionParams::Sqlite {
            db_path: source.path_string(),
        },
        CollectionInfo::new("assets", ["id", "name"], "id"),
        FieldMapping::new()
            .with("external_id", FieldRule::text("{id}"))
            .with("title", FieldRule::text("{name}").with_max_length(20)),
    )
}
