//! Row types for the transcript database
use serde::{Deserialize, Serialize};

/// One persisted message. Rows are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub id: i64,
    /// RFC 3339, UTC, microsecond precision.
    pub timestamp: String,
    pub role: String,
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct TranscriptStats {
    pub total_records: i64,
    pub total_sessions: i64,
    pub database_size_bytes: i64,
}

pub const CHATS_COLUMNS: &str = "id, timestamp, role, message, session_id";
