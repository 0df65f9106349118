//! # judge-db
//!
//! libSQL persistence for the judging engine.
//!
//! Holds items, judges, the decision log, ignore/view relations and
//! settings, and runs every judge transition as a snapshot → plan → commit
//! unit. Commits happen in a `BEGIN IMMEDIATE` transaction that compares the
//! `version` of every row the plan was computed from; a mismatch discards the
//! plan and the whole transition is retried with backoff.
//!
//! Each transition opens its own connection, so the database must live in a
//! file. WAL journaling lets snapshot reads proceed while another connection
//! commits.

pub mod coordinator;
pub mod error;
pub mod helpers;
mod migrations;
pub mod replay;
pub mod repos;
pub mod retry;
pub mod service;
pub(crate) mod snapshot;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Milliseconds a connection waits on a locked database before failing with
/// `SQLITE_BUSY`.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Central database handle.
///
/// Keeps one connection for administrative reads and writes, and hands out
/// fresh connections for judge transitions.
pub struct JudgeDb {
    db: libsql::Database,
    conn: libsql::Connection,
}

impl JudgeDb {
    /// Open a local database file, creating it if needed.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for `:memory:`, or
    /// `DatabaseError` if the database cannot be opened or migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        if path.trim().is_empty() || path == ":memory:" {
            return Err(DatabaseError::InvalidState(format!(
                "'{path}' is not a database file; transitions need per-connection access to shared state"
            )));
        }
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // journal_mode is persistent and returns a row, hence query().
        conn.query("PRAGMA journal_mode = WAL", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA journal_mode: {e}")))?;
        configure(&conn).await?;

        let judge_db = Self { db, conn };
        judge_db.run_migrations().await?;
        Ok(judge_db)
    }

    /// The shared administrative connection.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Open a fresh connection with per-connection pragmas applied.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection or a pragma fails.
    pub async fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.db.connect()?;
        configure(&conn).await?;
        Ok(conn)
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"itm-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        generate_id_on(&self.conn, prefix).await
    }
}

/// Pragmas that must be set on every connection.
async fn configure(conn: &libsql::Connection) -> Result<(), DatabaseError> {
    conn.execute("PRAGMA foreign_keys = ON", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;
    conn.query(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"), ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;
    Ok(())
}

/// Generate a prefixed ID on a specific connection (or transaction).
pub(crate) async fn generate_id_on(
    conn: &libsql::Connection,
    prefix: &str,
) -> Result<String, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
            (),
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<String>(0)?)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::test_support::helpers::TestDir;

    #[tokio::test]
    async fn open_local_creates_schema() {
        let dir = TestDir::new();
        let db = JudgeDb::open_local(&dir.db_path()).await.unwrap();

        for table in ["items", "judges", "ignores", "views", "decisions", "settings"] {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn memory_database_is_rejected() {
        let result = JudgeDb::open_local(":memory:").await;
        assert!(matches!(result, Err(DatabaseError::InvalidState(_))));
    }

    #[tokio::test]
    async fn wal_mode_is_enabled() {
        let dir = TestDir::new();
        let db = JudgeDb::open_local(&dir.db_path()).await.unwrap();
        let conn = db.connect().await.unwrap();
        let mut rows = conn.query("PRAGMA journal_mode", ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap().to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let dir = TestDir::new();
        let db = JudgeDb::open_local(&dir.db_path()).await.unwrap();
        for prefix in judge_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(judge_core::ids::has_prefix(&id, prefix), "bad id {id}");
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let dir = TestDir::new();
        let db = JudgeDb::open_local(&dir.db_path()).await.unwrap();
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let dir = TestDir::new();
        let db = JudgeDb::open_local(&dir.db_path()).await.unwrap();
        db.run_migrations().await.unwrap();
        drop(db);
        JudgeDb::open_local(&dir.db_path()).await.unwrap();
    }
}
