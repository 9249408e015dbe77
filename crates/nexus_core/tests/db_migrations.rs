use nexus_core::db::migrations::latest_version;
use nexus_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

fn user_version(conn: &Connection) -> u32 {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap()
}

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name;")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn fresh_memory_db_is_fully_migrated() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(user_version(&conn), latest_version());
    assert!(table_names(&conn).contains(&"preferences".to_string()));
}

#[test]
fn reopening_a_file_keeps_rows_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("nexus_prefs.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2);",
            ["ui.theme", "dark"],
        )
        .unwrap();
    }

    let reopened = open_db(&path).unwrap();
    assert_eq!(user_version(&reopened), latest_version());
    let theme: String = reopened
        .query_row(
            "SELECT value FROM preferences WHERE key = ?1;",
            ["ui.theme"],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(theme, "dark");
}

#[test]
fn file_from_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    Connection::open(&path)
        .unwrap()
        .pragma_update(None, "user_version", 999)
        .unwrap();

    let err = open_db(&path).unwrap_err();

    let DbError::UnsupportedSchemaVersion { found, supported } = err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!((found, supported), (999, latest_version()));
}

#[test]
fn blank_preference_key_violates_check_constraint() {
    let conn = open_db_in_memory().unwrap();

    let inserted = conn.execute(
        "INSERT INTO preferences (key, value) VALUES ('   ', 'x');",
        [],
    );

    assert!(inserted.is_err());
}

#[test]
fn unwritable_parent_folder_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"file").unwrap();

    let err = open_db(blocker.join("prefs.sqlite3")).unwrap_err();

    assert!(matches!(err, DbError::CreateDir { .. }));
}
