//! Persistence gateway: repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define aggregate-oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//! - Run parent/child cascades inside one `IMMEDIATE` transaction.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod day_repo;
pub mod routine_repo;
pub mod todo_repo;

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::common::{EntityKind, Hardness, Scariness};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all aggregate repositories.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target row does not exist.
    NotFound { entity: EntityKind, id: Uuid },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid domain value.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
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

/// Verifies the connection is migrated and carries `tables`.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

/// Next append position among the children of `parent_id`.
pub(crate) fn next_sort_order(
    conn: &Connection,
    table: &'static str,
    parent_column: &'static str,
    parent_id: Uuid,
) -> RepoResult<i64> {
    let next = conn.query_row(
        &format!(
            "SELECT COALESCE(MAX(sort_order), -1) + 1
             FROM {table}
             WHERE {parent_column} = ?1;"
        ),
        [parent_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(next)
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_hardness(value: &str, column: &'static str) -> RepoResult<Hardness> {
    Hardness::from_db_str(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid hardness `{value}` in {column}")))
}

pub(crate) fn parse_scariness(value: &str, column: &'static str) -> RepoResult<Scariness> {
    Scariness::from_db_str(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid scariness `{value}` in {column}")))
}

pub(crate) fn parse_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn parse_experience(value: i64, column: &'static str) -> RepoResult<u32> {
    u32::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid experience value `{value}` in {column}"))
    })
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
