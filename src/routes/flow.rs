use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Flow Router Module
///
/// The browser-facing surface of the authentication and continuation flow.
/// Every route here reads or writes tab-scoped state and forwards the browser's
/// cookies to the backend.
pub fn flow_routes() -> Router<AppState> {
    Router::new()
        // GET /continue?intent=<service_login|leveltest>&returnTo=<path>
        // The continuation rendezvous: dispatches the intent and resumes it.
        .route("/continue", get(handlers::continue_intent))
        // GET /sso?returnTo=<path>
        // SSO detour: resume if already authenticated, else hop to the IdP,
        // unless the redirect-loop guard trips.
        .route("/sso", get(handlers::sso))
        // GET /auth/callback?state=<path>[&error=<reason>]
        // The IdP's redirect URI: completes the service login and resumes `state`.
        .route("/auth/callback", get(handlers::auth_callback))
        // GET /login?returnTo=<path>
        // Login detour: the service_login flow with an explicit destination.
        .route("/login", get(handlers::login))
        // GET /signup?returnTo=<path>
        // Forces the SSO gate before handing over to the signup form.
        .route("/signup", get(handlers::signup))
        // GET|POST /auth-error/retry
        // "Try again": clears the redirect record and restarts from the root.
        .route(
            "/auth-error/retry",
            get(handlers::retry_auth).post(handlers::retry_auth),
        )
        // GET /session/hint
        // Optimistic nickname hint for the header; refreshed best-effort.
        .route("/session/hint", get(handlers::session_hint))
}
