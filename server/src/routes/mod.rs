//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the user data API and health endpoint under a single
//! Axum router with permissive CORS, since the data API is called directly
//! from browser and desktop clients on other origins.

pub mod auth;
pub mod data;
pub mod error;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/data",
            get(data::get_data)
                .post(data::post_data)
                .put(data::put_data)
                .delete(data::delete_data)
                .options(data::preflight),
        )
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
