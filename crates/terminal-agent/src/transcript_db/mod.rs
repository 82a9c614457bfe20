//! Transcript store - append-only SQLite log of every exchanged message
pub mod migration;
pub mod schema;

pub use migration::MigrationManager;
pub use schema::*;

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::memory::Role;

/// Single connection, opened once at startup and closed once at the end.
///
/// The session loop only ever calls [`TranscriptStore::append`]; the read
/// helpers exist for inspection and tests.
pub struct TranscriptStore {
    conn: Option<Connection>,
    session_id: String,
}

impl TranscriptStore {
    pub fn open(db_path: &Path, session_id: impl Into<String>) -> anyhow::Result<Self> {
        info!("Opening transcript database at: {}", db_path.display());
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory {}", parent.display())
                })?;
            }
        }

        let mut conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .with_context(|| format!("Failed to open transcript database {}", db_path.display()))?;

        let journal_mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        debug!("Transcript journal mode: {}", journal_mode);

        MigrationManager::new(&mut conn).initialize_database()?;
        Ok(Self::from_connection(conn, session_id.into()))
    }

    pub fn open_in_memory(session_id: impl Into<String>) -> anyhow::Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        MigrationManager::new(&mut conn).initialize_database()?;
        Ok(Self::from_connection(conn, session_id.into()))
    }

    fn from_connection(conn: Connection, session_id: String) -> Self {
        debug!("Transcript store ready for session {}", session_id);
        Self {
            conn: Some(conn),
            session_id,
        }
    }

    fn conn(&self) -> anyhow::Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Transcript store is closed"))
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Inserts one row stamped with the current UTC time and this store's
    /// session id. Autocommit: the row is durable when this returns.
    pub fn append(&self, role: Role, message: &str) -> anyhow::Result<TranscriptRecord> {
        let conn = self.conn()?;
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false);

        conn.execute(
            "INSERT INTO chats (timestamp, role, message, session_id) VALUES (?1, ?2, ?3, ?4)",
            params![timestamp, role.as_str(), message, self.session_id],
        )
        .context("Failed to append transcript record")?;

        let id = conn.last_insert_rowid();
        debug!("Appended transcript row {} ({}, {} chars)", id, role, message.len());

        Ok(TranscriptRecord {
            id,
            timestamp,
            role: role.as_str().to_string(),
            message: message.to_string(),
            session_id: self.session_id.clone(),
        })
    }

    pub fn records_for_session(&self, session_id: &str) -> anyhow::Result<Vec<TranscriptRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM chats WHERE session_id = ?1 ORDER BY id",
            CHATS_COLUMNS
        ))?;
        let records = stmt
            .query_map([session_id], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn count(&self) -> anyhow::Result<i64> {
        let count = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM chats", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn stats(&self) -> anyhow::Result<TranscriptStats> {
        Ok(migration::get_transcript_stats(self.conn()?)?)
    }

    /// Checkpoints the WAL and closes the connection.
    pub fn close(mut self) -> anyhow::Result<()> {
        match self.conn.take() {
            Some(conn) => {
                checkpoint(&conn);
                conn.close()
                    .map_err(|(_, e)| anyhow::anyhow!("Failed to close transcript database: {}", e))?;
                info!("Transcript store closed for session {}", self.session_id);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for TranscriptStore {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            checkpoint(&conn);
            if let Err((_, e)) = conn.close() {
                warn!("Transcript database did not close cleanly: {}", e);
            }
        }
    }
}

fn checkpoint(conn: &Connection) {
    // In-memory databases report "memory" and ignore the checkpoint.
    if let Err(e) = conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(())) {
        debug!("WAL checkpoint skipped: {}", e);
    }
}

fn row_to_record(row: &Row) -> rusqlite::Result<TranscriptRecord> {
    Ok(TranscriptRecord {
        id: row.get(0)?,
        timestamp: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        role: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        message: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        session_id: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}
