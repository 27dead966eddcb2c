use knighttodo_core::db::migrations::latest_version;
use knighttodo_core::db::{open_db, open_db_in_memory, DbError};
use knighttodo_core::{RepoError, SqliteDayRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "todo_blocks",
        "todos",
        "days",
        "day_todos",
        "routines",
        "routine_todos",
        "routine_instances",
        "routine_todo_instances",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let orphan = conn.execute(
        "INSERT INTO day_todos (id, day_id, day_todo_name, scariness, hardness, sort_order)
         VALUES ('t', 'missing-day', 'orphan', 'low', 'easy', 0);",
        [],
    );
    assert!(orphan.is_err());
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knighttodo.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "routine_todo_instances");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn version_one_store_is_upgraded_with_its_rows_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v1.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0001_init.sql"))
        .unwrap();
    conn.execute_batch(
        "INSERT INTO days (id, day_name) VALUES ('d1', 'Monday');
         PRAGMA user_version = 1;",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "routine_todo_instances");
    let day_name: String = conn
        .query_row("SELECT day_name FROM days WHERE id = 'd1';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(day_name, "Monday");
}

#[test]
fn failing_script_reports_its_version_and_keeps_the_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clash.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE todo_blocks (id TEXT PRIMARY KEY);")
        .unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::Migration { version, name, .. } => {
            assert_eq!(version, 1);
            assert_eq!(name, "init");
        }
        other => panic!("unexpected error: {other}"),
    }

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 0);
    let days_tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'days';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(days_tables, 0);
}

#[test]
fn repositories_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteDayRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        }) => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection must be rejected"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
