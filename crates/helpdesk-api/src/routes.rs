//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, request tracing, and all endpoint
//! handlers. Chat and analytics routes are nested under `/api`; the health
//! check and service banner live at the root.

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS middleware: allow localhost origins for dashboard access.
    // The configured port, port+1, and the conventional dashboard dev
    // server ports (3000 for CRA, 5173 for Vite).
    let port = state.config.general.port;
    let mut ports = vec![port, port.saturating_add(1), 3000, 5173];
    ports.sort_unstable();
    ports.dedup();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            ports
                .iter()
                .flat_map(|p| {
                    [
                        format!("http://127.0.0.1:{}", p),
                        format!("http://localhost:{}", p),
                    ]
                })
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let api_routes = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/chat/history/{session_id}", get(handlers::chat_history))
        .route("/chat/resolve/{session_id}", post(handlers::resolve))
        .route(
            "/chat/update-sentiment/{session_id}",
            post(handlers::update_sentiment),
        )
        .route("/analytics/dashboard", get(handlers::dashboard))
        .route("/analytics/conversations", get(handlers::conversations))
        .route(
            "/analytics/sentiment-trends",
            get(handlers::sentiment_trends),
        );

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured address.
///
/// Binds to 127.0.0.1 (localhost only) on the port from config.
pub async fn start_server(state: AppState) -> Result<(), helpdesk_core::error::HelpdeskError> {
    let port = state.config.general.port;
    let addr = format!("127.0.0.1:{}", port);

    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| helpdesk_core::error::HelpdeskError::Api(format!("Failed to bind: {}", e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| helpdesk_core::error::HelpdeskError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
