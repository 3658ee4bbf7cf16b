use std::sync::Arc;

use server::config::ServerConfig;
use server::services::session::MemorySessionStore;
use server::state::AppState;
use server::{db, routes};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();

    let state = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::init_pool(url).await.expect("database init failed");
            tracing::info!("using postgres record store");
            AppState::postgres(pool)
        }
        None => {
            let (state, sessions) = AppState::in_memory();
            seed_dev_session(&config, &sessions).await;
            tracing::warn!("DATABASE_URL not set; records are kept in memory and lost on restart");
            state
        }
    };

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "accountdata listening");
    axum::serve(listener, app).await.expect("server failed");
}

/// Register a session so the in-memory server is usable without a login flow.
async fn seed_dev_session(config: &ServerConfig, sessions: &Arc<MemorySessionStore>) {
    let (user_id, token) = sessions
        .seed_dev(config.dev_session_token.as_deref(), config.dev_user_id)
        .await;
    tracing::info!(%user_id, "dev session registered");
    tracing::debug!(%user_id, %token, "dev session token");
}
