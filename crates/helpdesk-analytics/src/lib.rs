//! Helpdesk analytics crate - read-only rollups for the dashboard.
//!
//! All queries are aggregate SQL over the conversations and messages
//! tables. Deterministic given store contents; empty stores degrade to
//! zero/empty defaults instead of failing.

pub mod dashboard;

pub use dashboard::{
    AnalyticsService, ConversationSummary, DashboardStats, SentimentDistribution, TrendPoint,
};
