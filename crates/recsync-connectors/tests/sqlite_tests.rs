//! Connector behaviour against real SQLite files

use pretty_assertions::assert_eq;
use recsync_connectors::{
    CollectionInfo, ConnectionParams, ConnectionType, Connector, ConnectorError, SqlValue,
    healthy_connection,
};
use recsync_test_utils::SqliteSource;

fn params(source: &SqliteSource) -> ConnectionParams {
    ConnectionParams::Sqlite {
        db_path: source.path_string(),
    }
}

fn assets() -> CollectionInfo {
    CollectionInfo::new("assets", ["id", "name"], "id")
}

fn ids(rows: &recsync_connectors::DbRows) -> Vec<String> {
    let mut ids: Vec<String> = rows
        .column_values("id")
        .unwrap_or_default()
        .iter()
        .map(|v| v.to_string())
        .collect();
    ids.sort();
    ids
}

#[test]
fn healthy_connection_returns_usable_connector() {
    let source = SqliteSource::with_assets(&[("A", "foo"), ("B", "bar")]);

    let conn = healthy_connection(ConnectionType::Sqlite, &params(&source), assets()).unwrap();

    assert_eq!(conn.collection().ident, "id");
    assert_eq!(conn.get_sample().unwrap().len(), 1);
}

#[test]
fn benning_sources_open_through_the_connection_type() {
    let source = SqliteSource::with_assets(&[("A", "foo")]);

    let conn = ConnectionType::Benning
        .healthy_connection(&params(&source), assets())
        .unwrap();

    assert_eq!(ids(&conn.get_new(&[]).unwrap()), vec!["A"]);
}

#[test]
fn healthy_connection_fails_on_empty_collection() {
    let source = SqliteSource::with_assets(&[]);

    let err = healthy_connection(ConnectionType::Sqlite, &params(&source), assets())
        .err()
        .unwrap();

    assert!(err.is_connection_failure(), "got {err:?}");
}

#[test]
fn healthy_connection_wraps_missing_table() {
    let source = SqliteSource::new();

    let err = healthy_connection(ConnectionType::Benning, &params(&source), assets())
        .err()
        .unwrap();

    match err {
        ConnectorError::ConnectionFailure { message, .. } => {
            assert!(message.contains("assets"), "cause should name the table: {message}")
        }
        other => panic!("expected connection failure, got {other:?}"),
    }
}

#[test]
fn get_new_and_get_old_split_on_known_idents() {
    let source = SqliteSource::with_assets(&[("A", "foo"), ("B", "bar"), ("C", "baz")]);
    let conn = healthy_connection(ConnectionType::Sqlite, &params(&source), assets()).unwrap();
    let known = vec!["A".to_string(), "C".to_string()];

    assert_eq!(ids(&conn.get_new(&known).unwrap()), vec!["B"]);
    assert_eq!(ids(&conn.get_old(&known).unwrap()), vec!["A", "C"]);
}

#[test]
fn get_new_without_known_returns_all() {
    let source = SqliteSource::with_assets(&[("A", "foo"), ("B", "bar")]);
    let conn = healthy_connection(ConnectionType::Sqlite, &params(&source), assets()).unwrap();

    assert_eq!(ids(&conn.get_new(&[]).unwrap()), vec!["A", "B"]);
    assert!(conn.get_old(&[]).unwrap().is_empty());
}

#[test]
fn integer_idents_match_stringified() {
    let source = SqliteSource::new();
    source.execute_batch(
        "CREATE TABLE machines (nr INTEGER PRIMARY KEY, label TEXT);
         INSERT INTO machines VALUES (1, 'press'), (2, 'drill'), (3, 'lathe');",
    );
    let info = CollectionInfo::new("machines", ["nr", "label"], "nr");
    let conn = healthy_connection(ConnectionType::Sqlite, &params(&source), info).unwrap();

    let old = conn.get_old(&["2".to_string()]).unwrap();

    assert_eq!(old.len(), 1);
    assert_eq!(old.record(0).unwrap()["label"], SqlValue::from("drill"));
    assert_eq!(conn.get_new(&["2".to_string()]).unwrap().len(), 2);
}

#[test]
fn reserved_word_ident_restricts_rows() {
    let source = SqliteSource::with_assets(&[("A", "foo"), ("B", "bar")]);
    let info = CollectionInfo::new("assets", ["order", "name"], "order")
        .with_hardcoded_query(r#"SELECT id AS "order", name FROM assets"#);
    let conn = healthy_connection(ConnectionType::Sqlite, &params(&source), info).unwrap();

    let old = conn.get_old(&["B".to_string()]).unwrap();
    let new = conn.get_new(&["B".to_string()]).unwrap();

    assert_eq!(old.len(), 1);
    assert_eq!(old.record(0).unwrap()["name"], SqlValue::from("bar"));
    assert_eq!(new.record(0).unwrap()["name"], SqlValue::from("foo"));
}

#[test]
fn hardcoded_query_replaces_projection() {
    let source = SqliteSource::with_assets(&[("A", "foo"), ("B", "bar")]);
    let info = assets().with_hardcoded_query("SELECT id, upper(name) AS name FROM assets;");
    let conn = healthy_connection(ConnectionType::Sqlite, &params(&source), info).unwrap();

    let rows = conn.get_old(&["B".to_string()]).unwrap();

    assert_eq!(rows.record(0).unwrap()["name"], SqlValue::from("BAR"));
}

#[test]
fn collections_are_sorted() {
    let source = SqliteSource::new();
    source.execute_batch(
        "CREATE TABLE zeta (id TEXT);
         CREATE TABLE alpha (id TEXT);
         CREATE VIEW middle AS SELECT id FROM alpha;",
    );

    let names = ConnectionType::Sqlite.collections(&params(&source)).unwrap();

    assert_eq!(names, vec!["alpha", "middle", "zeta"]);
}

#[test]
fn fields_lists_names_and_samples() {
    let source = SqliteSource::with_assets(&[("A", "foo"), ("B", "bar")]);

    let listing = ConnectionType::Sqlite.fields(&params(&source), "assets").unwrap();

    assert_eq!(listing.names, vec!["id", "name"]);
    assert_eq!(listing.samples["name"].len(), 2);
}

#[test]
fn fields_samples_are_capped() {
    let source = SqliteSource::with_assets(&[]);
    for i in 0..60 {
        source.upsert_asset(&format!("id{i}"), "x");
    }

    let listing = ConnectionType::Sqlite.fields(&params(&source), "assets").unwrap();

    assert_eq!(listing.samples["id"].len(), 50);
}
