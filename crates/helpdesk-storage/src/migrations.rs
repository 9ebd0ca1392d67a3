//! Database schema migrations.
//!
//! Applies the initial schema: conversations, messages, and the
//! schema_migrations tracking table.

use rusqlite::Connection;
use tracing::info;

use helpdesk_core::error::HelpdeskError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental changes.
pub fn run_migrations(conn: &Connection) -> Result<(), HelpdeskError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| HelpdeskError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| HelpdeskError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<(), HelpdeskError> {
    conn.execute_batch(
        "
        -- One row per support conversation, unique per session key.
        CREATE TABLE IF NOT EXISTS conversations (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id         TEXT NOT NULL UNIQUE,
            customer_name      TEXT,
            created_at         INTEGER NOT NULL,
            status             TEXT NOT NULL DEFAULT 'active'
                               CHECK (status IN ('active', 'resolved', 'escalated')),
            escalated          INTEGER NOT NULL DEFAULT 0,
            average_sentiment  REAL
        );

        CREATE INDEX IF NOT EXISTS idx_conversations_session
            ON conversations (session_id);

        CREATE INDEX IF NOT EXISTS idx_conversations_status
            ON conversations (status, created_at DESC);

        -- Immutable message log. Sentiment columns are user messages only.
        CREATE TABLE IF NOT EXISTS messages (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            conversation_id  INTEGER NOT NULL,
            session_id       TEXT NOT NULL,
            role             TEXT NOT NULL
                             CHECK (role IN ('user', 'assistant')),
            content          TEXT NOT NULL,
            sentiment_score  REAL,
            sentiment_label  TEXT
                             CHECK (sentiment_label IN ('positive', 'neutral', 'negative')
                                    OR sentiment_label IS NULL),
            timestamp        INTEGER NOT NULL,
            FOREIGN KEY (conversation_id) REFERENCES conversations(id)
        );

        CREATE INDEX IF NOT EXISTS idx_messages_conversation
            ON messages (conversation_id, timestamp ASC);

        CREATE INDEX IF NOT EXISTS idx_messages_session
            ON messages (session_id, timestamp ASC);

        -- Record migration.
        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| HelpdeskError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}
