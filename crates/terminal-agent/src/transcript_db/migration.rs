//! Transcript schema migrations

use rusqlite::{Connection, Result};
use tracing::{debug, error, info, warn};

use crate::transcript_db::schema::TranscriptStats;

/// Applies versioned schema scripts on top of whatever the database file already holds.
pub struct MigrationManager<'a> {
    conn: &'a mut Connection,
}

impl<'a> MigrationManager<'a> {
    pub fn new(conn: &'a mut Connection) -> Self {
        Self { conn }
    }

    /// Initialize database with current schema
    pub fn initialize_database(&mut self) -> Result<()> {
        debug!("Initializing transcript schema...");

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        let current_version = self.get_current_version()?;
        debug!("Current transcript schema version: {}", current_version);

        self.apply_migrations(current_version)
    }

    fn apply_migrations(&mut self, current_version: i32) -> Result<()> {
        for (version, migration_sql) in get_migrations() {
            if version <= current_version {
                continue;
            }
            info!("Applying transcript migration {}...", version);

            let tx = self.conn.transaction()?;
            if let Err(e) = tx.execute_batch(migration_sql) {
                error!("Failed to apply migration {}: {}", version, e);
                return Err(e);
            }
            tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
            tx.commit()?;
        }
        Ok(())
    }

    pub fn get_current_version(&self) -> Result<i32> {
        self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

fn get_migrations() -> Vec<(i32, &'static str)> {
    vec![
        (1, include_str!("migrations/001_create_chats.sql")),
        (2, include_str!("migrations/002_index_session.sql")),
    ]
}

pub fn get_transcript_stats(conn: &Connection) -> Result<TranscriptStats> {
    let total_records: i64 = conn.query_row("SELECT COUNT(*) FROM chats", [], |row| row.get(0))?;
    let total_sessions: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT session_id) FROM chats",
        [],
        |row| row.get(0),
    )?;

    let database_size_bytes: i64 = conn
        .query_row(
            "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()",
            [],
            |row| row.get(0),
        )
        .unwrap_or_else(|e| {
            warn!("Failed to read database size: {}", e);
            0
        });

    Ok(TranscriptStats {
        total_records,
        total_sessions,
        database_size_bytes,
    })
}
