//! Roster slot repository.
//!
//! # Responsibility
//! - Read and write the roster as one JSON array in a named storage slot.
//!
//! # Invariants
//! - A missing slot is `Ok(None)`; an unreadable slot is `InvalidData`.
//! - Writes replace the whole slot atomically.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot holding the JSON-serialized ordered roster.
pub const ROSTER_SLOT: &str = "employees";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Slot exists but does not hold a JSON array of strings.
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for the roster.
pub trait RosterRepository {
    /// Returns stored names in stored order, `None` when nothing was saved.
    fn load_roster(&self) -> RepoResult<Option<Vec<String>>>;
    /// Replaces the stored roster.
    fn save_roster(&self, names: &[String]) -> RepoResult<()>;
}

/// SQLite-backed roster repository that owns its connection.
pub struct SqliteRosterRepository {
    conn: Connection,
}

impl SqliteRosterRepository {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when migrations have not been applied.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = 'storage_slots'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable("storage_slots"));
        }
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn read_slot(&self, name: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM storage_slots WHERE name = ?1;",
                [name],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_slot(&self, name: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO storage_slots (name, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![name, value],
        )?;
        Ok(())
    }
}

impl RosterRepository for SqliteRosterRepository {
    fn load_roster(&self) -> RepoResult<Option<Vec<String>>> {
        let Some(raw) = self.read_slot(ROSTER_SLOT)? else {
            return Ok(None);
        };
        let names = serde_json::from_str::<Vec<String>>(&raw).map_err(|err| {
            RepoError::InvalidData(format!("slot `{ROSTER_SLOT}` is not a name list: {err}"))
        })?;
        Ok(Some(names))
    }

    fn save_roster(&self, names: &[String]) -> RepoResult<()> {
        let raw = serde_json::to_string(names).map_err(|err| {
            RepoError::InvalidData(format!("roster cannot be encoded: {err}"))
        })?;
        self.write_slot(ROSTER_SLOT, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::{RepoError, RosterRepository, SqliteRosterRepository, ROSTER_SLOT};
    use crate::db::open_db_in_memory;
    use rusqlite::Connection;

    #[test]
    fn missing_slot_loads_as_none() {
        let repo = SqliteRosterRepository::try_new(open_db_in_memory().expect("open db"))
            .expect("repo");
        assert!(repo.load_roster().expect("load").is_none());
    }

    #[test]
    fn save_then_load_preserves_order() {
        let repo = SqliteRosterRepository::try_new(open_db_in_memory().expect("open db"))
            .expect("repo");
        let names = vec!["Eva Blom".to_string(), "Bram Jansen".to_string()];
        repo.save_roster(&names).expect("save");
        repo.save_roster(&names[..1]).expect("overwrite");
        assert_eq!(
            repo.load_roster().expect("load"),
            Some(vec!["Eva Blom".to_string()])
        );
    }

    #[test]
    fn corrupt_slot_is_invalid_data() {
        let repo = SqliteRosterRepository::try_new(open_db_in_memory().expect("open db"))
            .expect("repo");
        repo.connection()
            .execute(
                "INSERT INTO storage_slots (name, value) VALUES (?1, '{not json');",
                [ROSTER_SLOT],
            )
            .expect("seed corrupt slot");
        assert!(matches!(
            repo.load_roster(),
            Err(RepoError::InvalidData(_))
        ));
    }

    #[test]
    fn unmigrated_connection_is_rejected() {
        let conn = Connection::open_in_memory().expect("raw connection");
        assert!(matches!(
            SqliteRosterRepository::try_new(conn),
            Err(RepoError::MissingRequiredTable("storage_slots"))
        ));
    }
}
