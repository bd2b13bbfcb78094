use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints that never touch the backend or the browser-session store.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // GET /auth-error
        // Where the redirect-loop guard sends the user: remediation steps and a
        // "try again" action. Rendering it does not reset anything.
        .route("/auth-error", get(handlers::auth_error))
}
