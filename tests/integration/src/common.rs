//! Fixtures shared by the end-to-end tests
//!
//! A wiremock server plays the remote record API; the reconciler talks to it
//! through the real blocking HTTP client on tokio's blocking pool.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use recsync_connectors::{CollectionInfo, ConnectionParams, ConnectionType};
use recsync_core::{
    ConnectionStructure, FieldMapping, FieldRule, HistoryStore, HttpRemote, Reconciler,
    RemoteConfig, RunSummary, SyncConfig, SyncOptions, Target,
};
use recsync_test_utils::SqliteSource;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn asset_config(server: &MockServer, source: &SqliteSource) -> SyncConfig {
    let structure = ConnectionStructure::new(
        ConnectionType::Sqlite,
        ConnectionParams::Sqlite {
            db_path: source.path_string(),
        },
        CollectionInfo::new("assets", ["id", "name"], "id"),
        FieldMapping::new()
            .with("external_id", FieldRule::text("{id}"))
            .with("title", FieldRule::text("{name}").with_max_length(40)),
    );
    SyncConfig::new(RemoteConfig::new(server.uri(), "e2e-key")).with_target(Target::Asset, structure)
}

/// Mount health, identifiers and accepting write endpoints
pub async fn mount_remote(server: &MockServer, known: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/healthchecks/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"auth_status": {"has_permission": true}})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sync/asset/get_idents/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "idents": known })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sync/asset/bulk/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sync/asset/update_by_ident/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

/// Run a full sync the way the binary does, history on disk
pub async fn run_sync(config: SyncConfig, history_path: PathBuf, options: SyncOptions) -> RunSummary {
    tokio::task::spawn_blocking(move || {
        let remote = HttpRemote::healthy(&config.remote).expect("remote healthy");
        let mut history = HistoryStore::load(&history_path).expect("history loads");
        Reconciler::new(&remote, &mut history, options).run(&config)
    })
    .await
    .expect("sync task panicked")
}

/// JSON bodies of every request the server received on `endpoint`
pub async fn bodies(server: &MockServer, endpoint: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == endpoint)
        .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
        .collect()
}

pub fn history_path(dir: &Path) -> PathBuf {
    dir.join("history.json")
}
