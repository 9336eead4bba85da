//! HTTP server for the credential authority.
//!
//! Provides endpoints for:
//! - Application credential requests (`/auth`)
//! - Health check (`/health`)

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod error;
mod handlers;

pub use error::GatewayError;
pub use handlers::issue_credentials;

/// Create the HTTP router.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so the
/// credential handler can see the peer address.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth", post(handlers::request_credentials))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
