//! Conversation lifecycle management.
//!
//! Wraps the storage repositories with the domain rules: idempotent
//! get-or-create by session key, rolling-average sentiment maintenance on
//! user messages, and the escalation policy thresholds.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use helpdesk_core::error::Result;
use helpdesk_core::types::{Conversation, Message, MessageRole, Sentiment};
use helpdesk_storage::{ConversationRepository, Database, MessageRepository, NewMessage};

/// A single message below this score escalates immediately.
pub const ESCALATION_SCORE_FLOOR: f64 = -0.5;

/// Sustained-negativity threshold for the streak rule.
pub const NEGATIVE_STREAK_THRESHOLD: f64 = -0.3;

/// Number of consecutive recent user messages the streak rule inspects.
pub const NEGATIVE_STREAK_LEN: usize = 3;

/// Owns conversation state transitions and the escalation policy.
pub struct ConversationManager {
    conversations: ConversationRepository,
    messages: MessageRepository,
}

impl ConversationManager {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            conversations: ConversationRepository::new(Arc::clone(&db)),
            messages: MessageRepository::new(db),
        }
    }

    /// Return the conversation for a session key, creating it (active, not
    /// escalated) on first sight. Idempotent by session key.
    pub fn get_or_create(
        &self,
        session_id: &str,
        customer_name: Option<&str>,
    ) -> Result<Conversation> {
        if let Some(existing) = self.conversations.find_by_session(session_id)? {
            return Ok(existing);
        }
        let created = self
            .conversations
            .create(session_id, customer_name, Utc::now())?;
        info!(session = %session_id, id = created.id, "Conversation created");
        Ok(created)
    }

    /// Append a message, creating the conversation if absent.
    ///
    /// When the message is a scored user message, the conversation's average
    /// sentiment is recomputed over all historical non-null user scores
    /// (full recompute, not incremental).
    pub fn append_message(
        &self,
        session_id: &str,
        role: MessageRole,
        content: &str,
        sentiment: Option<Sentiment>,
    ) -> Result<Message> {
        let conversation = self.get_or_create(session_id, None)?;

        let message = self.messages.insert(NewMessage {
            conversation_id: conversation.id,
            session_id,
            role,
            content,
            sentiment,
            timestamp: Utc::now(),
        })?;

        if role == MessageRole::User && sentiment.is_some() {
            self.update_average_sentiment(conversation.id)?;
        }

        Ok(message)
    }

    /// Mark a conversation escalated. No-op if the session is unknown.
    pub fn escalate(&self, session_id: &str) -> Result<()> {
        info!(session = %session_id, "Conversation escalated");
        self.conversations.escalate(session_id)
    }

    /// Mark a conversation resolved. No-op if the session is unknown.
    pub fn resolve(&self, session_id: &str) -> Result<()> {
        info!(session = %session_id, "Conversation resolved");
        self.conversations.resolve(session_id)
    }

    /// Decide whether a conversation needs human intervention.
    ///
    /// True when the latest score is below the floor, or when the three
    /// most-recent user messages all carry a non-null score below the streak
    /// threshold. Fewer than three scored user messages never triggers the
    /// streak rule.
    pub fn should_escalate(&self, latest_score: f64, conversation_id: i64) -> Result<bool> {
        if latest_score < ESCALATION_SCORE_FLOOR {
            return Ok(true);
        }

        let recent = self
            .messages
            .recent_user_scores(conversation_id, NEGATIVE_STREAK_LEN as u64)?;
        if recent.len() < NEGATIVE_STREAK_LEN {
            return Ok(false);
        }

        let all_negative = recent
            .iter()
            .all(|s| matches!(s, Some(score) if *score < NEGATIVE_STREAK_THRESHOLD));
        if all_negative {
            debug!(conversation_id, "Negative streak detected");
        }
        Ok(all_negative)
    }

    /// Full conversation history, oldest first.
    pub fn history(&self, session_id: &str) -> Result<Vec<Message>> {
        self.messages.history(session_id)
    }

    /// Recompute and store the average sentiment for a session.
    ///
    /// Debug operation backing the update-sentiment endpoint. Returns the
    /// recomputed average and the number of scored user messages.
    pub fn recompute_sentiment(&self, session_id: &str) -> Result<(Option<f64>, u64)> {
        let conversation = self.get_or_create(session_id, None)?;
        let (average, count) = self.messages.user_score_stats(conversation.id)?;
        if average.is_some() {
            self.conversations
                .set_average_sentiment(conversation.id, average)?;
        }
        Ok((average, count))
    }

    fn update_average_sentiment(&self, conversation_id: i64) -> Result<()> {
        let (average, _) = self.messages.user_score_stats(conversation_id)?;
        if average.is_some() {
            self.conversations
                .set_average_sentiment(conversation_id, average)?;
        }
        Ok(())
    }
}
