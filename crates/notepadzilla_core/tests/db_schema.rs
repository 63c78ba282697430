use notepadzilla_core::db::schema::schema_version;
use notepadzilla_core::db::{open_db, open_db_in_memory, DbError, SCHEMA_VERSION};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_kv_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    assert_table_exists(&conn, "kv_entries");
}

#[test]
fn reopening_file_database_keeps_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notepadzilla.db");

    let first = open_db(&path).unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second).unwrap(), SCHEMA_VERSION);
    assert_table_exists(&second, "kv_entries");
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
    let untouched = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&untouched).unwrap(), 999);
}

#[test]
fn reopening_keeps_stored_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kv.db");

    let first = open_db(&path).unwrap();
    first
        .execute("INSERT INTO kv_entries (key, value) VALUES ('k', 'v');", [])
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    let value: String = second
        .query_row("SELECT value FROM kv_entries WHERE key = 'k';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(value, "v");
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
