//! Route handler functions for all API endpoints.
//!
//! Each handler extracts path/query parameters via axum extractors,
//! interacts with AppState services, and returns JSON responses.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use helpdesk_analytics::{ConversationSummary, DashboardStats, TrendPoint};
use helpdesk_core::types::{ConversationStatus, MessageRole, SentimentLabel};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request and query parameter types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
    pub customer_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationsParams {
    pub status: Option<String>,
    pub limit: Option<u64>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub should_escalate: bool,
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageDetail {
    pub id: i64,
    pub role: MessageRole,
    pub content: String,
    pub sentiment_score: Option<f64>,
    pub sentiment_label: Option<SentimentLabel>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateSentimentResponse {
    pub sentiment: Option<f64>,
    pub message_count: u64,
}

#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub trends: Vec<TrendPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub service: String,
    pub version: String,
}

// =============================================================================
// Chat handlers
// =============================================================================

/// POST /api/chat - score the message, generate a reply, apply escalation.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.session_id.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Field 'session_id' must not be empty".to_string(),
        ));
    }
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Field 'message' must not be empty".to_string(),
        ));
    }

    let conversation = state
        .manager
        .get_or_create(&req.session_id, req.customer_name.as_deref())?;

    let sentiment = state.analyzer.analyze(&req.message);
    state.manager.append_message(
        &req.session_id,
        MessageRole::User,
        &req.message,
        Some(sentiment),
    )?;

    let history = state.manager.history(&req.session_id)?;
    let reply = state.responder.reply(&req.message, &history).await;
    state
        .manager
        .append_message(&req.session_id, MessageRole::Assistant, &reply, None)?;

    let should_escalate = state
        .manager
        .should_escalate(sentiment.score, conversation.id)?;
    if should_escalate {
        state.manager.escalate(&req.session_id)?;
    }

    info!(
        session = %req.session_id,
        score = sentiment.score,
        escalate = should_escalate,
        "Chat turn handled"
    );

    Ok(Json(ChatResponse {
        response: reply,
        sentiment_score: sentiment.score,
        sentiment_label: sentiment.label,
        should_escalate,
        session_id: req.session_id,
    }))
}

/// GET /api/chat/history/{session_id} - ordered turns, oldest first.
///
/// Unknown sessions yield an empty list rather than an error.
pub async fn chat_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<MessageDetail>>, ApiError> {
    let messages = state.manager.history(&session_id)?;
    let details = messages
        .into_iter()
        .map(|m| MessageDetail {
            id: m.id,
            role: m.role,
            content: m.content,
            sentiment_score: m.sentiment_score,
            sentiment_label: m.sentiment_label,
            timestamp: m.timestamp,
        })
        .collect();
    Ok(Json(details))
}

/// POST /api/chat/resolve/{session_id} - mark resolved.
///
/// No-op for unknown sessions; the response is the same either way.
pub async fn resolve(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ResolveResponse>, ApiError> {
    state.manager.resolve(&session_id)?;
    Ok(Json(ResolveResponse {
        status: "resolved".to_string(),
    }))
}

/// POST /api/chat/update-sentiment/{session_id} - debug recompute.
///
/// Recomputes the stored average from all scored user messages and reports
/// the result. Null sentiment and a zero count when nothing is scored yet.
pub async fn update_sentiment(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<UpdateSentimentResponse>, ApiError> {
    let (sentiment, message_count) = state.manager.recompute_sentiment(&session_id)?;
    Ok(Json(UpdateSentimentResponse {
        sentiment,
        message_count,
    }))
}

// =============================================================================
// Analytics handlers
// =============================================================================

/// GET /api/analytics/dashboard - full dashboard rollup.
pub async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.analytics.dashboard_stats()?))
}

/// GET /api/analytics/conversations - bare list of summaries, newest first.
pub async fn conversations(
    State(state): State<AppState>,
    Query(params): Query<ConversationsParams>,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    let status = match params.status.as_deref() {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(ConversationStatus::parse(raw).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Invalid status '{}'. Must be one of: active, resolved, escalated",
                raw
            ))
        })?),
    };
    let limit = params.limit.unwrap_or(50).clamp(1, 200);

    Ok(Json(state.analytics.list_conversations(status, limit)?))
}

/// GET /api/analytics/sentiment-trends - daily mean user sentiment.
pub async fn sentiment_trends(
    State(state): State<AppState>,
) -> Result<Json<TrendsResponse>, ApiError> {
    Ok(Json(TrendsResponse {
        trends: state.analytics.sentiment_over_time()?,
    }))
}

// =============================================================================
// Service handlers
// =============================================================================

/// GET /health - liveness check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET / - service banner.
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        service: "helpdesk".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Fallback for unmatched routes: JSON 404 instead of an empty body.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("No such route".to_string())
}
