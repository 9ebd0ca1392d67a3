//! Helpdesk application binary - composition root.
//!
//! Ties together all Helpdesk crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Open SQLite storage and run migrations
//! 3. Build the sentiment analyzer and responder per config
//! 4. Start the axum REST API server

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use helpdesk_api::routes;
use helpdesk_api::state::AppState;
use helpdesk_chat::responder_for;
use helpdesk_core::config::HelpdeskConfig;
use helpdesk_sentiment::analyzer_for;
use helpdesk_storage::Database;

use cli::CliArgs;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config first: the log level may come from it.
    let config_file = args.resolve_config_path();
    let mut config = HelpdeskConfig::load_or_default(&config_file);

    // Tracing. RUST_LOG wins, then --log-level, then the config file.
    let log_level = args
        .resolve_log_level()
        .unwrap_or_else(|| config.general.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Helpdesk v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // CLI and environment overrides.
    config.general.port = args.resolve_port(config.general.port);
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }

    // The provider key is seeded from the environment once, at startup.
    if config.provider.api_key.is_empty() {
        if let Ok(key) = std::env::var("HELPDESK_API_KEY") {
            config.provider.api_key = key;
        }
    }
    if config.responder.strategy == "llm" && config.provider.api_key.is_empty() {
        tracing::warn!("Responder strategy is 'llm' but no API key is configured");
    }

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }

    let db_path = data_dir.join("helpdesk.db");
    let database = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    // Strategy components.
    let analyzer = Arc::from(analyzer_for(&config.sentiment.engine));
    let responder = Arc::from(responder_for(&config.responder.strategy, &config.provider));
    tracing::info!(
        engine = %config.sentiment.engine,
        strategy = %config.responder.strategy,
        "Chat pipeline ready"
    );

    // API server.
    let state = AppState::new(config, database, analyzer, responder);
    routes::start_server(state).await?;

    Ok(())
}
