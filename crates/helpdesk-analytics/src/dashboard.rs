//! Dashboard aggregation queries.
//!
//! AnalyticsService computes read-only rollups straight from SQLite.
//! Nothing here mutates the store, so the numbers are always consistent
//! with whatever the chat pipeline has committed.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::debug;

use helpdesk_core::error::HelpdeskError;
use helpdesk_core::types::ConversationStatus;
use helpdesk_storage::Database;

/// Issue tags with the lowercase keywords that map onto them. A user
/// message counts once per tag no matter how many of its keywords match.
const ISSUE_TAGS: &[(&str, &[&str])] = &[
    ("password", &["password", "login", "access", "sign in"]),
    ("order", &["order", "delivery", "shipping", "track"]),
    ("refund", &["refund", "return", "money back"]),
    ("account", &["account", "profile", "settings"]),
    ("payment", &["payment", "charge", "billing", "card"]),
    ("technical", &["error", "bug", "not working", "broken"]),
];

/// Placeholder shown when no user message matched any issue tag.
const NO_DATA_PLACEHOLDER: &str = "No data yet";

/// Share of user messages per sentiment label, as percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentDistribution {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl Default for SentimentDistribution {
    fn default() -> Self {
        Self {
            positive: 0.0,
            neutral: 0.0,
            negative: 0.0,
        }
    }
}

/// Top-level numbers for the dashboard endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_conversations: u64,
    pub resolved_conversations: u64,
    pub escalated_conversations: u64,
    /// Percentage of conversations resolved, rounded to 2 decimals.
    pub resolution_rate: f64,
    /// Mean of per-conversation averages, rounded to 3 decimals.
    pub average_sentiment: f64,
    pub sentiment_distribution: SentimentDistribution,
    pub common_issues: Vec<String>,
}

/// One conversation row for the dashboard listing.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub id: i64,
    pub session_id: String,
    pub customer_name: Option<String>,
    pub status: ConversationStatus,
    pub escalated: bool,
    pub average_sentiment: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Mean user sentiment for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub sentiment: f64,
}

fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

/// Read-only aggregate queries over the conversation store.
pub struct AnalyticsService {
    db: Arc<Database>,
}

impl AnalyticsService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Full dashboard rollup: counts, rates, distribution, and top issues.
    pub fn dashboard_stats(&self) -> Result<DashboardStats, HelpdeskError> {
        let (total, resolved, escalated) = self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT COUNT(*),
                        SUM(CASE WHEN status = 'resolved' THEN 1 ELSE 0 END),
                        SUM(CASE WHEN escalated = 1 THEN 1 ELSE 0 END)
                 FROM conversations",
                [],
                |row| {
                    let total: i64 = row.get(0)?;
                    let resolved: Option<i64> = row.get(1)?;
                    let escalated: Option<i64> = row.get(2)?;
                    Ok((
                        total as u64,
                        resolved.unwrap_or(0) as u64,
                        escalated.unwrap_or(0) as u64,
                    ))
                },
            )
            .map_err(|e| HelpdeskError::Storage(format!("Conversation counts failed: {}", e)))
        })?;

        let resolution_rate = if total > 0 {
            round_to(resolved as f64 / total as f64 * 100.0, 2)
        } else {
            0.0
        };

        let average_sentiment = self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT AVG(average_sentiment) FROM conversations
                 WHERE average_sentiment IS NOT NULL",
                [],
                |row| row.get::<_, Option<f64>>(0),
            )
            .map_err(|e| HelpdeskError::Storage(format!("Average sentiment failed: {}", e)))
        })?;

        debug!(total, resolved, escalated, "Dashboard stats computed");

        Ok(DashboardStats {
            total_conversations: total,
            resolved_conversations: resolved,
            escalated_conversations: escalated,
            resolution_rate,
            average_sentiment: round_to(average_sentiment.unwrap_or(0.0), 3),
            sentiment_distribution: self.sentiment_distribution()?,
            common_issues: self.common_issues()?,
        })
    }

    /// Percentage split of labelled user messages across the three labels.
    ///
    /// All zeros when no user message carries a label yet.
    pub fn sentiment_distribution(&self) -> Result<SentimentDistribution, HelpdeskError> {
        let counts: HashMap<String, i64> = self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT sentiment_label, COUNT(*) FROM messages
                     WHERE role = 'user' AND sentiment_label IS NOT NULL
                     GROUP BY sentiment_label",
                )
                .map_err(|e| HelpdeskError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })
                .map_err(|e| HelpdeskError::Storage(e.to_string()))?;

            let mut counts = HashMap::new();
            for row in rows {
                let (label, count) = row.map_err(|e| HelpdeskError::Storage(e.to_string()))?;
                counts.insert(label, count);
            }
            Ok(counts)
        })?;

        let total: i64 = counts.values().sum();
        if total == 0 {
            return Ok(SentimentDistribution::default());
        }

        let pct = |label: &str| {
            round_to(
                *counts.get(label).unwrap_or(&0) as f64 / total as f64 * 100.0,
                1,
            )
        };

        Ok(SentimentDistribution {
            positive: pct("positive"),
            neutral: pct("neutral"),
            negative: pct("negative"),
        })
    }

    /// Most frequent issue tags across all user messages, at most five.
    ///
    /// Falls back to a single placeholder entry when nothing matched.
    pub fn common_issues(&self) -> Result<Vec<String>, HelpdeskError> {
        let contents: Vec<String> = self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT content FROM messages WHERE role = 'user'")
                .map_err(|e| HelpdeskError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|e| HelpdeskError::Storage(e.to_string()))?;

            let mut contents = Vec::new();
            for row in rows {
                contents.push(row.map_err(|e| HelpdeskError::Storage(e.to_string()))?);
            }
            Ok(contents)
        })?;

        let mut tallies = vec![0u64; ISSUE_TAGS.len()];
        for content in &contents {
            let lowered = content.to_lowercase();
            for (i, (_, keywords)) in ISSUE_TAGS.iter().enumerate() {
                if keywords.iter().any(|kw| lowered.contains(kw)) {
                    tallies[i] += 1;
                }
            }
        }

        let mut ranked: Vec<(u64, usize)> = tallies
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(i, count)| (*count, i))
            .collect();
        // Ties resolve in tag table order.
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        if ranked.is_empty() {
            return Ok(vec![NO_DATA_PLACEHOLDER.to_string()]);
        }

        Ok(ranked
            .into_iter()
            .take(5)
            .map(|(_, i)| ISSUE_TAGS[i].0.to_string())
            .collect())
    }

    /// Daily mean of user sentiment scores, oldest day first.
    pub fn sentiment_over_time(&self) -> Result<Vec<TrendPoint>, HelpdeskError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT date(timestamp, 'unixepoch') AS day, AVG(sentiment_score)
                     FROM messages
                     WHERE role = 'user' AND sentiment_score IS NOT NULL
                     GROUP BY day
                     ORDER BY day ASC",
                )
                .map_err(|e| HelpdeskError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
                })
                .map_err(|e| HelpdeskError::Storage(e.to_string()))?;

            let mut points = Vec::new();
            for row in rows {
                let (date, avg) = row.map_err(|e| HelpdeskError::Storage(e.to_string()))?;
                points.push(TrendPoint {
                    date,
                    sentiment: round_to(avg, 3),
                });
            }
            Ok(points)
        })
    }

    /// Conversations newest first, optionally filtered by status.
    pub fn list_conversations(
        &self,
        status: Option<ConversationStatus>,
        limit: u64,
    ) -> Result<Vec<ConversationSummary>, HelpdeskError> {
        self.db.with_conn(|conn| {
            let sql = match status {
                Some(_) => {
                    "SELECT id, session_id, customer_name, status, escalated,
                            average_sentiment, created_at
                     FROM conversations
                     WHERE status = ?1
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?2"
                }
                None => {
                    "SELECT id, session_id, customer_name, status, escalated,
                            average_sentiment, created_at
                     FROM conversations
                     WHERE ?1 IS NULL
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?2"
                }
            };

            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| HelpdeskError::Storage(e.to_string()))?;

            let status_param = status.map(|s| s.as_str());
            let rows = stmt
                .query_map(rusqlite::params![status_param, limit as i64], |row| {
                    let status: String = row.get(3)?;
                    let created_at: i64 = row.get(6)?;
                    Ok(ConversationSummary {
                        id: row.get(0)?,
                        session_id: row.get(1)?,
                        customer_name: row.get(2)?,
                        status: ConversationStatus::parse(&status)
                            .unwrap_or(ConversationStatus::Active),
                        escalated: row.get::<_, i64>(4)? != 0,
                        average_sentiment: row.get(5)?,
                        created_at: Utc
                            .timestamp_opt(created_at, 0)
                            .single()
                            .unwrap_or_default(),
                    })
                })
                .map_err(|e| HelpdeskError::Storage(e.to_string()))?;

            let mut summaries = Vec::new();
            for row in rows {
                summaries.push(row.map_err(|e| HelpdeskError::Storage(e.to_string()))?);
            }
            Ok(summaries)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use helpdesk_core::types::{MessageRole, Sentiment, SentimentLabel};
    use helpdesk_storage::{ConversationRepository, MessageRepository, NewMessage};

    fn setup() -> (
        Arc<Database>,
        ConversationRepository,
        MessageRepository,
        AnalyticsService,
    ) {
        let db = Arc::new(Database::in_memory().unwrap());
        (
            Arc::clone(&db),
            ConversationRepository::new(Arc::clone(&db)),
            MessageRepository::new(Arc::clone(&db)),
            AnalyticsService::new(db),
        )
    }

    fn ts(epoch: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(epoch, 0).single().unwrap()
    }

    fn insert_user(
        messages: &MessageRepository,
        conversation_id: i64,
        session_id: &str,
        content: &str,
        sentiment: Option<(f64, SentimentLabel)>,
        at: i64,
    ) {
        messages
            .insert(NewMessage {
                conversation_id,
                session_id,
                role: MessageRole::User,
                content,
                sentiment: sentiment.map(|(score, label)| Sentiment { score, label }),
                timestamp: ts(at),
            })
            .unwrap();
    }

    // ---- dashboard_stats ----

    #[test]
    fn test_empty_store_defaults() {
        let (_db, _convs, _msgs, analytics) = setup();

        let stats = analytics.dashboard_stats().unwrap();
        assert_eq!(stats.total_conversations, 0);
        assert_eq!(stats.resolved_conversations, 0);
        assert_eq!(stats.escalated_conversations, 0);
        assert_eq!(stats.resolution_rate, 0.0);
        assert_eq!(stats.average_sentiment, 0.0);
        assert_eq!(stats.sentiment_distribution, SentimentDistribution::default());
        assert_eq!(stats.common_issues, vec!["No data yet".to_string()]);
    }

    #[test]
    fn test_counts_and_resolution_rate() {
        let (_db, convs, _msgs, analytics) = setup();

        for i in 0..4 {
            convs
                .create(&format!("sess-{i}"), None, ts(1700000000 + i))
                .unwrap();
        }
        convs.resolve("sess-0").unwrap();
        convs.escalate("sess-1").unwrap();

        let stats = analytics.dashboard_stats().unwrap();
        assert_eq!(stats.total_conversations, 4);
        assert_eq!(stats.resolved_conversations, 1);
        assert_eq!(stats.escalated_conversations, 1);
        assert_eq!(stats.resolution_rate, 25.0);
    }

    #[test]
    fn test_resolution_rate_rounds_to_two_decimals() {
        let (_db, convs, _msgs, analytics) = setup();

        for i in 0..3 {
            convs
                .create(&format!("sess-{i}"), None, ts(1700000000 + i))
                .unwrap();
        }
        convs.resolve("sess-0").unwrap();

        let stats = analytics.dashboard_stats().unwrap();
        assert_eq!(stats.resolution_rate, 33.33);
    }

    #[test]
    fn test_average_sentiment_ignores_unscored_conversations() {
        let (_db, convs, _msgs, analytics) = setup();

        let a = convs.create("sess-a", None, ts(1700000000)).unwrap();
        let b = convs.create("sess-b", None, ts(1700000001)).unwrap();
        convs.create("sess-c", None, ts(1700000002)).unwrap();

        convs.set_average_sentiment(a.id, Some(0.5)).unwrap();
        convs.set_average_sentiment(b.id, Some(0.25)).unwrap();

        let stats = analytics.dashboard_stats().unwrap();
        assert_eq!(stats.average_sentiment, 0.375);
    }

    // ---- sentiment_distribution ----

    #[test]
    fn test_distribution_percentages() {
        let (_db, convs, msgs, analytics) = setup();
        let conv = convs.create("sess-1", None, ts(1700000000)).unwrap();

        insert_user(&msgs, conv.id, "sess-1", "great", Some((0.6, SentimentLabel::Positive)), 1);
        insert_user(&msgs, conv.id, "sess-1", "perfect", Some((0.6, SentimentLabel::Positive)), 2);
        insert_user(&msgs, conv.id, "sess-1", "awful", Some((-0.6, SentimentLabel::Negative)), 3);
        insert_user(&msgs, conv.id, "sess-1", "okay", Some((0.0, SentimentLabel::Neutral)), 4);

        let dist = analytics.sentiment_distribution().unwrap();
        assert_eq!(dist.positive, 50.0);
        assert_eq!(dist.negative, 25.0);
        assert_eq!(dist.neutral, 25.0);
    }

    #[test]
    fn test_distribution_skips_unlabelled_and_assistant() {
        let (_db, convs, msgs, analytics) = setup();
        let conv = convs.create("sess-1", None, ts(1700000000)).unwrap();

        insert_user(&msgs, conv.id, "sess-1", "great", Some((0.6, SentimentLabel::Positive)), 1);
        insert_user(&msgs, conv.id, "sess-1", "hm", None, 2);
        msgs.insert(NewMessage {
            conversation_id: conv.id,
            session_id: "sess-1",
            role: MessageRole::Assistant,
            content: "glad to help",
            sentiment: None,
            timestamp: ts(3),
        })
        .unwrap();

        let dist = analytics.sentiment_distribution().unwrap();
        assert_eq!(dist.positive, 100.0);
        assert_eq!(dist.neutral, 0.0);
        assert_eq!(dist.negative, 0.0);
    }

    // ---- common_issues ----

    #[test]
    fn test_common_issues_ranked_by_frequency() {
        let (_db, convs, msgs, analytics) = setup();
        let conv = convs.create("sess-1", None, ts(1700000000)).unwrap();

        insert_user(&msgs, conv.id, "sess-1", "where is my order", None, 1);
        insert_user(&msgs, conv.id, "sess-1", "order still not here", None, 2);
        insert_user(&msgs, conv.id, "sess-1", "tracking my order", None, 3);
        insert_user(&msgs, conv.id, "sess-1", "I want a refund", None, 4);

        let issues = analytics.common_issues().unwrap();
        assert_eq!(issues[0], "order");
        assert_eq!(issues[1], "refund");
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_common_issues_one_message_many_tags() {
        let (_db, convs, msgs, analytics) = setup();
        let conv = convs.create("sess-1", None, ts(1700000000)).unwrap();

        insert_user(
            &msgs,
            conv.id,
            "sess-1",
            "billing error on my account after password reset",
            None,
            1,
        );

        let issues = analytics.common_issues().unwrap();
        // One hit each; ties resolve in tag table order.
        assert_eq!(issues, vec!["password", "account", "payment", "technical"]);
    }

    #[test]
    fn test_common_issues_placeholder_when_nothing_matches() {
        let (_db, convs, msgs, analytics) = setup();
        let conv = convs.create("sess-1", None, ts(1700000000)).unwrap();

        insert_user(&msgs, conv.id, "sess-1", "hello there", None, 1);

        let issues = analytics.common_issues().unwrap();
        assert_eq!(issues, vec!["No data yet".to_string()]);
    }

    #[test]
    fn test_common_issues_capped_at_five() {
        let (_db, convs, msgs, analytics) = setup();
        let conv = convs.create("sess-1", None, ts(1700000000)).unwrap();

        let samples = [
            "password reset please",
            "order is late",
            "need a refund",
            "account locked",
            "payment failed",
            "app shows an error",
        ];
        for (i, content) in samples.iter().enumerate() {
            insert_user(&msgs, conv.id, "sess-1", content, None, i as i64 + 1);
        }

        let issues = analytics.common_issues().unwrap();
        assert_eq!(issues.len(), 5);
    }

    // ---- sentiment_over_time ----

    #[test]
    fn test_trends_grouped_by_day() {
        let (_db, convs, msgs, analytics) = setup();
        let conv = convs.create("sess-1", None, ts(1700000000)).unwrap();

        // 2023-11-14 (epoch 1699920000 is 00:00 UTC) and the next day.
        let day1 = 1699920000;
        let day2 = day1 + 86400;
        insert_user(&msgs, conv.id, "sess-1", "a", Some((0.6, SentimentLabel::Positive)), day1);
        insert_user(&msgs, conv.id, "sess-1", "b", Some((0.0, SentimentLabel::Neutral)), day1 + 60);
        insert_user(&msgs, conv.id, "sess-1", "c", Some((-0.6, SentimentLabel::Negative)), day2);
        // Unscored messages are excluded from the daily mean.
        insert_user(&msgs, conv.id, "sess-1", "d", None, day2 + 60);

        let points = analytics.sentiment_over_time().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, "2023-11-14");
        assert_eq!(points[0].sentiment, 0.3);
        assert_eq!(points[1].date, "2023-11-15");
        assert_eq!(points[1].sentiment, -0.6);
    }

    #[test]
    fn test_trends_empty_store() {
        let (_db, _convs, _msgs, analytics) = setup();
        assert!(analytics.sentiment_over_time().unwrap().is_empty());
    }

    // ---- list_conversations ----

    #[test]
    fn test_list_conversations_newest_first() {
        let (_db, convs, _msgs, analytics) = setup();

        convs.create("sess-old", None, ts(1700000000)).unwrap();
        convs.create("sess-new", None, ts(1700000100)).unwrap();

        let listed = analytics.list_conversations(None, 50).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].session_id, "sess-new");
        assert_eq!(listed[1].session_id, "sess-old");
    }

    #[test]
    fn test_list_conversations_status_filter_and_limit() {
        let (_db, convs, _msgs, analytics) = setup();

        for i in 0..3 {
            convs
                .create(&format!("sess-{i}"), None, ts(1700000000 + i))
                .unwrap();
        }
        convs.resolve("sess-1").unwrap();

        let resolved = analytics
            .list_conversations(Some(ConversationStatus::Resolved), 50)
            .unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].session_id, "sess-1");

        let limited = analytics.list_conversations(None, 2).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].session_id, "sess-2");
    }
}
