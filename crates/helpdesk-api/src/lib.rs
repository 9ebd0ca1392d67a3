//! Helpdesk API crate - axum HTTP server and route handlers.
//!
//! Provides the REST API for the support chat backend: the chat endpoint
//! with sentiment scoring and auto-escalation, conversation history and
//! resolution, and the analytics dashboard queries.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
