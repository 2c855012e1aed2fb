use syncspot_core::db::migrations::{current_user_version, latest_version};
use syncspot_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "rooms");
    assert_table_exists(&conn, "submissions");
    assert_table_exists(&conn, "room_dates");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("syncspot.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn_first).unwrap(), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn_second).unwrap(), latest_version());
    assert_table_exists(&conn_second, "rooms");
}

#[test]
fn file_database_runs_in_wal_mode() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("wal.db")).unwrap();

    let mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_ascii_lowercase(), "wal");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

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
fn failed_schema_step_is_named_and_rolled_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conflict.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE room_dates (legacy TEXT);")
        .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match &err {
        DbError::Migration { version, name, .. } => {
            assert_eq!(*version, 2);
            assert_eq!(*name, "candidate_dates");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("schema step 2 (candidate_dates)"));

    let conn = Connection::open(&path).unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), 0);
    let rooms: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'rooms';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rooms, 0);
}

#[test]
fn schema_rejects_room_type_change_and_reopen() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO rooms (uuid, room_type, vote_kind, status, created_at, updated_at)
         VALUES ('r1', 'EACH', 'time', 'CLOSED', 0, 0);",
        [],
    )
    .unwrap();

    assert!(conn
        .execute("UPDATE rooms SET room_type = 'ALONE' WHERE uuid = 'r1';", [])
        .is_err());
    assert!(conn
        .execute("UPDATE rooms SET status = 'OPEN' WHERE uuid = 'r1';", [])
        .is_err());
    assert!(conn
        .execute("UPDATE rooms SET room_type = 'GROUP' WHERE uuid = 'r1';", [])
        .is_err());
}

#[test]
fn schema_keeps_one_submission_per_participant() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO rooms (uuid, room_type, vote_kind, created_at, updated_at)
         VALUES ('r1', 'EACH', 'place', 0, 0);",
        [],
    )
    .unwrap();
    let insert = "INSERT INTO submissions (room_uuid, participant, payload, first_submitted_at, updated_at)
                  VALUES ('r1', 'mina', '{}', 0, 0);";

    conn.execute(insert, []).unwrap();
    assert!(conn.execute(insert, []).is_err());
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
