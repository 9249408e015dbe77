//! Key/value preference persistence.
//!
//! # Responsibility
//! - Read, upsert and delete UI preferences in the `preferences` table.
//!
//! # Invariants
//! - Keys are non-blank after trim.
//! - The repository only accepts connections migrated to the latest version.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PreferenceRepoResult<T> = Result<T, PreferenceRepoError>;

#[derive(Debug)]
pub enum PreferenceRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Key is blank after trim.
    BlankKey,
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for PreferenceRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::BlankKey => write!(f, "preference key must not be blank"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "preference repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "preference repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "preference repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for PreferenceRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for PreferenceRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PreferenceRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Preference storage contract.
pub trait PreferenceRepository {
    fn get(&self, key: &str) -> PreferenceRepoResult<Option<String>>;
    /// Inserts or overwrites one value.
    fn set(&self, key: &str, value: &str) -> PreferenceRepoResult<()>;
    /// Removes one key; returns whether it existed.
    fn remove(&self, key: &str) -> PreferenceRepoResult<bool>;
}

/// SQLite-backed preference repository.
#[derive(Debug)]
pub struct SqlitePreferenceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePreferenceRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> PreferenceRepoResult<Self> {
        ensure_preferences_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PreferenceRepository for SqlitePreferenceRepository<'_> {
    fn get(&self, key: &str) -> PreferenceRepoResult<Option<String>> {
        let key = normalize_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> PreferenceRepoResult<()> {
        let key = normalize_key(key)?;
        self.conn.execute(
            "INSERT INTO preferences (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        log::info!("event=pref_set module=prefs status=ok key={key}");
        Ok(())
    }

    fn remove(&self, key: &str) -> PreferenceRepoResult<bool> {
        let key = normalize_key(key)?;
        let changed = self
            .conn
            .execute("DELETE FROM preferences WHERE key = ?1;", [key])?;
        log::info!("event=pref_remove module=prefs status=ok key={key} existed={}", changed > 0);
        Ok(changed > 0)
    }
}

fn normalize_key(key: &str) -> PreferenceRepoResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(PreferenceRepoError::BlankKey);
    }
    Ok(trimmed)
}

const PREFERENCES_TABLE: &str = "preferences";
const PREFERENCES_COLUMNS: [&str; 3] = ["key", "value", "updated_at"];

fn ensure_preferences_ready(conn: &Connection) -> PreferenceRepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(PreferenceRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let columns = table_columns(conn, PREFERENCES_TABLE)?;
    if columns.is_empty() {
        return Err(PreferenceRepoError::MissingRequiredTable(PREFERENCES_TABLE));
    }
    match PREFERENCES_COLUMNS
        .into_iter()
        .find(|required| !columns.iter().any(|column| column == required))
    {
        Some(column) => Err(PreferenceRepoError::MissingRequiredColumn {
            table: PREFERENCES_TABLE,
            column,
        }),
        None => Ok(()),
    }
}

/// Column names of `table`; empty when the table does not exist.
fn table_columns(conn: &Connection, table: &str) -> PreferenceRepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}
