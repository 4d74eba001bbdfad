//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per aggregate.
//! - Isolate SQLite query details from service orchestration.
//! - Classify store failures into the shared error taxonomy.
//!
//! # Invariants
//! - Lookup misses are `Ok(None)` or an empty `Vec`, never errors; only
//!   mutations targeting a missing row surface `NotFound`.
//! - Duplicate-key and foreign-key failures surface as
//!   `ConstraintViolation` exactly as the store reports them; repositories
//!   never pre-check uniqueness.
//! - Transient store failures (busy, locked, cannot open) surface as
//!   `StoreUnavailable` without retries at this layer.
//!
//! # See also
//! - docs/architecture/data-model.md

use std::error::Error;
use std::fmt::{Display, Formatter};

use rusqlite::{Connection, ErrorCode};

use crate::db::{migrations::latest_version, DbError};

pub mod bookmark_repo;
pub mod post_repo;
pub mod profile_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Shared error taxonomy for profile, post and bookmark persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Store transport or schema bootstrap failure.
    Db(DbError),
    /// A mutation targeted a row that does not exist.
    NotFound {
        entity: &'static str,
        key: String,
    },
    /// The store rejected a write that breaks a declared constraint
    /// (unique nickname, unique owner, unique bookmark pair, foreign key).
    ConstraintViolation {
        detail: String,
    },
    /// The store could not be reached or was busy; transient by contract.
    StoreUnavailable {
        detail: String,
    },
    /// Persisted state failed to decode into a domain record.
    InvalidData(String),
    /// The connection was handed over without migrations applied.
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

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::ConstraintViolation { detail } => {
                write!(f, "store constraint violated: {detail}")
            }
            Self::StoreUnavailable { detail } => write!(f, "store unavailable: {detail}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{column}` is missing from `{table}`")
            }
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
        let classified = match &value {
            rusqlite::Error::SqliteFailure(code, message) => {
                let detail = message.clone().unwrap_or_else(|| code.to_string());
                match code.code {
                    ErrorCode::ConstraintViolation => {
                        Some(Self::ConstraintViolation { detail })
                    }
                    ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen => {
                        Some(Self::StoreUnavailable { detail })
                    }
                    _ => None,
                }
            }
            _ => None,
        };

        match classified {
            Some(err) => err,
            None => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// Verifies that a connection carries the current schema before a
/// repository accepts it.
///
/// Checked once at repository construction so query paths can assume the
/// listed tables and columns exist.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    required: &[(&'static str, &[&'static str])],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in required {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
