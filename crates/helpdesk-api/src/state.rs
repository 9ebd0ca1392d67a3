//! Application state shared across all route handlers.
//!
//! AppState holds references to all services and shared resources.
//! It is passed to handlers via axum's State extractor.

use std::sync::Arc;

use helpdesk_analytics::AnalyticsService;
use helpdesk_chat::{ConversationManager, Responder};
use helpdesk_core::config::HelpdeskConfig;
use helpdesk_sentiment::SentimentAnalyzer;
use helpdesk_storage::Database;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks. The
/// configuration is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<HelpdeskConfig>,
    /// SQLite database for persistent storage.
    pub database: Arc<Database>,
    /// Conversation lifecycle and escalation policy.
    pub manager: Arc<ConversationManager>,
    /// Sentiment classifier for incoming user messages.
    pub analyzer: Arc<dyn SentimentAnalyzer>,
    /// Reply generation strategy.
    pub responder: Arc<dyn Responder>,
    /// Read-only dashboard rollups.
    pub analytics: Arc<AnalyticsService>,
}

impl AppState {
    /// Create a new AppState with the given components.
    pub fn new(
        config: HelpdeskConfig,
        database: Arc<Database>,
        analyzer: Arc<dyn SentimentAnalyzer>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            manager: Arc::new(ConversationManager::new(Arc::clone(&database))),
            analytics: Arc::new(AnalyticsService::new(Arc::clone(&database))),
            database,
            analyzer,
            responder,
        }
    }
}
