//! A dry run computes what a real run would send, and sends nothing

mod common;

use common::{asset_config, bodies, history_path, mount_remote, run_sync};
use pretty_assertions::assert_eq;
use recsync_connectors::{CollectionInfo, ConnectionType, healthy_connection};
use recsync_core::{SyncOptions, Target, transform};
use recsync_test_utils::SqliteSource;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::MockServer;

#[tokio::test]
async fn dry_run_writes_nothing_anywhere() {
    let state = TempDir::new().unwrap();
    let source = SqliteSource::with_assets(&[("A", "foo"), ("B", "bar")]);
    let server = MockServer::start().await;
    mount_remote(&server, &["A"]).await;

    let summary = run_sync(
        asset_config(&server, &source),
        history_path(state.path()),
        SyncOptions::dry_run(),
    )
    .await;

    // B is new, A is known without history: both would be pushed
    assert_eq!(summary.success(), 2);
    assert!(summary.dry_run);
    let writes = server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .count();
    assert_eq!(writes, 0);
    assert!(!history_path(state.path()).exists());
}

#[tokio::test]
async fn real_run_sends_the_payloads_a_dry_run_computes() {
    let state = TempDir::new().unwrap();
    let source = SqliteSource::with_assets(&[("A", "foo\nsecond line"), ("B", "bar")]);
    let server = MockServer::start().await;
    mount_remote(&server, &[]).await;
    let config = asset_config(&server, &source);

    let structure = config.target(Target::Asset).unwrap().clone();
    let connector = healthy_connection(
        ConnectionType::Sqlite,
        &structure.connection_info,
        CollectionInfo::new("assets", ["id", "name"], "id"),
    )
    .unwrap();
    let records = connector.get_new(&[]).unwrap().into_records();
    let expected: Vec<Value> = transform(&records, &structure.field_mapping, &structure.encoding)
        .unwrap()
        .into_iter()
        .map(Value::Object)
        .collect();

    run_sync(config.clone(), history_path(state.path()), SyncOptions::dry_run()).await;
    assert!(bodies(&server, "/sync/asset/bulk/").await.is_empty());

    run_sync(config, history_path(state.path()), SyncOptions::default()).await;

    assert_eq!(
        bodies(&server, "/sync/asset/bulk/").await,
        vec![json!({ "new_data": expected })]
    );
    assert_eq!(expected[0]["title"], json!("foo | second line"));
}
