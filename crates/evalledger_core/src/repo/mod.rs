//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define per-store data access contracts over the shared SQLite schema.
//! - Isolate SQL details from service orchestration.
//! - Guard against connections whose schema was never migrated.
//!
//! # Invariants
//! - Repositories never open their own transactions; the orchestrator scopes
//!   one transaction across all stores it touches.
//! - Counter rows (`course_id`, `ledger_height`) are advanced only through
//!   [`advance_counter`], which keeps them strictly monotonic.

pub mod course_repo;
pub mod enrollment_repo;
pub mod evaluation_repo;

use crate::db::migrations::latest_version;
use rusqlite::Connection;
use self::course_repo::{RepoError, RepoResult};

/// Counter row allocating monotonic course ids.
pub(crate) const COUNTER_COURSE_ID: &str = "course_id";
/// Counter row acting as the ledger's logical clock.
pub(crate) const COUNTER_LEDGER_HEIGHT: &str = "ledger_height";

const REQUIRED_TABLES: &[(&str, &[&str])] = &[
    ("courses", &["id", "name", "instructor", "accepting"]),
    ("enrollments", &["course_id", "student", "enrolled"]),
    (
        "evaluations",
        &["course_id", "student", "rating", "commentary", "submitted_at"],
    ),
    ("aggregates", &["course_id", "rating_sum", "rating_count"]),
    ("counters", &["name", "value"]),
];

/// Verifies the connection carries the fully migrated ledger schema.
///
/// # Errors
/// - `UninitializedConnection` when `PRAGMA user_version` does not match the
///   latest migration known to this binary.
/// - `MissingRequiredTable` / `MissingRequiredColumn` when the physical
///   schema diverges from the migrated shape.
pub fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version =
        conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for (table, columns) in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for column in *columns {
            if !column_exists(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

/// Increments one counter row and returns the advanced value.
pub(crate) fn advance_counter(conn: &Connection, name: &str) -> RepoResult<i64> {
    let changed = conn.execute(
        "UPDATE counters SET value = value + 1 WHERE name = ?1;",
        [name],
    )?;
    if changed == 0 {
        return Err(RepoError::InvalidData(format!(
            "counter row `{name}` is missing"
        )));
    }
    counter_value(conn, name)
}

/// Reads one counter row's current value.
pub(crate) fn counter_value(conn: &Connection, name: &str) -> RepoResult<i64> {
    let value = conn
        .query_row(
            "SELECT value FROM counters WHERE name = ?1;",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .map_err(|err| match err {
            rusqlite::Error::QueryReturnedNoRows => {
                RepoError::InvalidData(format!("counter row `{name}` is missing"))
            }
            other => other.into(),
        })?;
    Ok(value)
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2
        );",
        [table, column],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
