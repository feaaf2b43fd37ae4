//! End-to-end reconciliation: SQLite source, HTTP remote, history on disk

mod common;

use common::{asset_config, bodies, history_path, mount_remote, run_sync};
use pretty_assertions::assert_eq;
use recsync_connectors::{Record, SqlValue};
use recsync_core::{HistoryStore, SummaryStatus, SyncOptions, Target};
use recsync_test_utils::SqliteSource;
use serde_json::json;
use tempfile::TempDir;
use wiremock::MockServer;

fn asset(id: &str, name: &str) -> Record {
    Record::from([
        ("id".to_string(), SqlValue::from(id)),
        ("name".to_string(), SqlValue::from(name)),
    ])
}

#[tokio::test]
async fn known_unchanged_record_stays_quiet_until_it_changes() {
    let state = TempDir::new().unwrap();
    let source = SqliteSource::with_assets(&[("A", "foo"), ("B", "bar")]);

    // The remote already holds A, pushed by an earlier run
    let mut seeded = HistoryStore::load(&history_path(state.path())).unwrap();
    seeded.commit(Target::Asset, &asset("A", "foo"), "id").unwrap();
    seeded.flush().unwrap();

    let server = MockServer::start().await;
    mount_remote(&server, &["A"]).await;

    let first = run_sync(
        asset_config(&server, &source),
        history_path(state.path()),
        SyncOptions::default(),
    )
    .await;

    assert_eq!(first.status(), SummaryStatus::AllSucceeded);
    assert_eq!(first.success(), 1);
    assert_eq!(
        bodies(&server, "/sync/asset/bulk/").await,
        vec![json!({"new_data": [{"external_id": "B", "title": "bar"}]})]
    );
    assert!(bodies(&server, "/sync/asset/update_by_ident/").await.is_empty());

    // Now the remote knows both, and A changes at the source
    server.reset().await;
    mount_remote(&server, &["B", "A"]).await;
    source.upsert_asset("A", "foobar");

    let second = run_sync(
        asset_config(&server, &source),
        history_path(state.path()),
        SyncOptions::default(),
    )
    .await;

    assert_eq!(second.success(), 1);
    assert!(bodies(&server, "/sync/asset/bulk/").await.is_empty());
    assert_eq!(
        bodies(&server, "/sync/asset/update_by_ident/").await,
        vec![json!({"new_data": {"external_id": "A", "title": "foobar"}})]
    );

    let history = HistoryStore::load(&history_path(state.path())).unwrap();
    assert_eq!(history.history().len(Target::Asset), 2);
}

#[tokio::test]
async fn first_run_is_full_sync_then_nothing_to_do() {
    let state = TempDir::new().unwrap();
    let source = SqliteSource::with_assets(&[("A", "foo"), ("B", "bar"), ("C", "baz")]);
    let server = MockServer::start().await;
    mount_remote(&server, &[]).await;

    let first = run_sync(
        asset_config(&server, &source),
        history_path(state.path()),
        SyncOptions::default(),
    )
    .await;
    assert_eq!(first.success(), 3);

    server.reset().await;
    mount_remote(&server, &["C", "B", "A"]).await;

    let second = run_sync(
        asset_config(&server, &source),
        history_path(state.path()),
        SyncOptions::default(),
    )
    .await;

    assert_eq!(second.status(), SummaryStatus::NothingToDo);
    assert!(bodies(&server, "/sync/asset/bulk/").await.is_empty());
    assert!(bodies(&server, "/sync/asset/update_by_ident/").await.is_empty());
}

#[tokio::test]
async fn remote_rejecting_bulk_leaves_history_empty() {
    let state = TempDir::new().unwrap();
    let source = SqliteSource::with_assets(&[("A", "foo")]);
    let server = MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .respond_with(wiremock::ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_remote(&server, &[]).await;

    let summary = run_sync(
        asset_config(&server, &source),
        history_path(state.path()),
        SyncOptions::default(),
    )
    .await;

    assert_eq!(summary.status(), SummaryStatus::TotalFailure);
    let history = HistoryStore::load(&history_path(state.path())).unwrap();
    assert!(history.history().is_empty());
}
