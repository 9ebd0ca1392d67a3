//! Repository implementations for SQLite-backed persistence.
//!
//! Provides ConversationRepository and MessageRepository that operate on
//! the Database struct using raw SQL.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{OptionalExtension, Row};

use helpdesk_core::error::HelpdeskError;
use helpdesk_core::types::{
    Conversation, ConversationStatus, Message, MessageRole, Sentiment, SentimentLabel,
};

use crate::db::Database;

fn row_to_conversation(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    let status: String = row.get(4)?;
    let created_at: i64 = row.get(3)?;
    Ok(Conversation {
        id: row.get(0)?,
        session_id: row.get(1)?,
        customer_name: row.get(2)?,
        created_at: Utc
            .timestamp_opt(created_at, 0)
            .single()
            .unwrap_or_default(),
        status: ConversationStatus::parse(&status).unwrap_or(ConversationStatus::Active),
        escalated: row.get::<_, i64>(5)? != 0,
        average_sentiment: row.get(6)?,
    })
}

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    let role: String = row.get(3)?;
    let label: Option<String> = row.get(6)?;
    let timestamp: i64 = row.get(7)?;
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        session_id: row.get(2)?,
        role: MessageRole::parse(&role).unwrap_or(MessageRole::User),
        content: row.get(4)?,
        sentiment_score: row.get(5)?,
        sentiment_label: label.as_deref().and_then(SentimentLabel::parse),
        timestamp: Utc.timestamp_opt(timestamp, 0).single().unwrap_or_default(),
    })
}

const CONVERSATION_COLUMNS: &str =
    "id, session_id, customer_name, created_at, status, escalated, average_sentiment";

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, session_id, role, content, sentiment_score, sentiment_label, timestamp";

/// Repository for conversation rows.
pub struct ConversationRepository {
    db: Arc<Database>,
}

impl ConversationRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Find a conversation by its session key.
    pub fn find_by_session(&self, session_id: &str) -> Result<Option<Conversation>, HelpdeskError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE session_id = ?1"),
                rusqlite::params![session_id],
                row_to_conversation,
            )
            .optional()
            .map_err(|e| HelpdeskError::Storage(format!("Conversation lookup failed: {}", e)))
        })
    }

    /// Create a new active conversation for a session key.
    pub fn create(
        &self,
        session_id: &str,
        customer_name: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<Conversation, HelpdeskError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (session_id, customer_name, created_at, status, escalated)
                 VALUES (?1, ?2, ?3, 'active', 0)",
                rusqlite::params![session_id, customer_name, created_at.timestamp()],
            )
            .map_err(|e| HelpdeskError::Storage(format!("Failed to create conversation: {}", e)))?;

            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
                rusqlite::params![id],
                row_to_conversation,
            )
            .map_err(|e| HelpdeskError::Storage(format!("Failed to read back conversation: {}", e)))
        })
    }

    /// Mark a conversation escalated. Silent no-op when the session is unknown.
    pub fn escalate(&self, session_id: &str) -> Result<(), HelpdeskError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE conversations SET escalated = 1, status = 'escalated'
                 WHERE session_id = ?1",
                rusqlite::params![session_id],
            )
            .map_err(|e| HelpdeskError::Storage(format!("Failed to escalate: {}", e)))?;
            Ok(())
        })
    }

    /// Mark a conversation resolved. The escalated flag is left as-is.
    /// Silent no-op when the session is unknown.
    pub fn resolve(&self, session_id: &str) -> Result<(), HelpdeskError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE conversations SET status = 'resolved' WHERE session_id = ?1",
                rusqlite::params![session_id],
            )
            .map_err(|e| HelpdeskError::Storage(format!("Failed to resolve: {}", e)))?;
            Ok(())
        })
    }

    /// Store a recomputed rolling average.
    pub fn set_average_sentiment(
        &self,
        conversation_id: i64,
        average: Option<f64>,
    ) -> Result<(), HelpdeskError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE conversations SET average_sentiment = ?1 WHERE id = ?2",
                rusqlite::params![average, conversation_id],
            )
            .map_err(|e| HelpdeskError::Storage(format!("Failed to update sentiment: {}", e)))?;
            Ok(())
        })
    }
}

/// Parameters for inserting a new message.
#[derive(Debug, Clone)]
pub struct NewMessage<'a> {
    pub conversation_id: i64,
    pub session_id: &'a str,
    pub role: MessageRole,
    pub content: &'a str,
    pub sentiment: Option<Sentiment>,
    pub timestamp: DateTime<Utc>,
}

/// Repository for message rows.
pub struct MessageRepository {
    db: Arc<Database>,
}

impl MessageRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a message and return the stored row.
    pub fn insert(&self, new: NewMessage<'_>) -> Result<Message, HelpdeskError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (conversation_id, session_id, role, content,
                                       sentiment_score, sentiment_label, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    new.conversation_id,
                    new.session_id,
                    new.role.as_str(),
                    new.content,
                    new.sentiment.map(|s| s.score),
                    new.sentiment.map(|s| s.label.as_str()),
                    new.timestamp.timestamp(),
                ],
            )
            .map_err(|e| HelpdeskError::Storage(format!("Failed to insert message: {}", e)))?;

            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                rusqlite::params![id],
                row_to_message,
            )
            .map_err(|e| HelpdeskError::Storage(format!("Failed to read back message: {}", e)))
        })
    }

    /// All messages for a session, oldest first.
    ///
    /// The id tiebreak keeps same-second user/assistant pairs in insertion
    /// order.
    pub fn history(&self, session_id: &str) -> Result<Vec<Message>, HelpdeskError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE session_id = ?1
                     ORDER BY timestamp ASC, id ASC"
                ))
                .map_err(|e| HelpdeskError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![session_id], row_to_message)
                .map_err(|e| HelpdeskError::Storage(e.to_string()))?;

            let mut messages = Vec::new();
            for row in rows {
                messages.push(row.map_err(|e| HelpdeskError::Storage(e.to_string()))?);
            }
            Ok(messages)
        })
    }

    /// Sentiment scores of the most recent user messages, newest first.
    ///
    /// Unscored user messages appear as `None`; the escalation policy needs
    /// to distinguish them from scored ones.
    pub fn recent_user_scores(
        &self,
        conversation_id: i64,
        limit: u64,
    ) -> Result<Vec<Option<f64>>, HelpdeskError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT sentiment_score FROM messages
                     WHERE conversation_id = ?1 AND role = 'user'
                     ORDER BY timestamp DESC, id DESC
                     LIMIT ?2",
                )
                .map_err(|e| HelpdeskError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![conversation_id, limit as i64], |row| {
                    row.get::<_, Option<f64>>(0)
                })
                .map_err(|e| HelpdeskError::Storage(e.to_string()))?;

            let mut scores = Vec::new();
            for row in rows {
                scores.push(row.map_err(|e| HelpdeskError::Storage(e.to_string()))?);
            }
            Ok(scores)
        })
    }

    /// Mean and count of non-null user-message scores for a conversation.
    pub fn user_score_stats(
        &self,
        conversation_id: i64,
    ) -> Result<(Option<f64>, u64), HelpdeskError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT AVG(sentiment_score), COUNT(sentiment_score) FROM messages
                 WHERE conversation_id = ?1 AND role = 'user'
                   AND sentiment_score IS NOT NULL",
                rusqlite::params![conversation_id],
                |row| {
                    let avg: Option<f64> = row.get(0)?;
                    let count: i64 = row.get(1)?;
                    Ok((avg, count as u64))
                },
            )
            .map_err(|e| HelpdeskError::Storage(format!("Score stats query failed: {}", e)))
        })
    }
}
