use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Flow core: transport, classification, guard, continuation.
pub mod api;
pub mod client;
pub mod continuation;
pub mod gates;
pub mod hints;
pub mod navigation;
pub mod redirect_guard;
pub mod scope;
pub mod storage;
pub mod transport;

// Shared types and settings.
pub mod config;
pub mod messages;
pub mod models;

// Web shell: HTTP surface hosting the flow.
pub mod handlers;
pub mod routes;
pub mod session;
pub mod views;

use routes::{flow, public};

// --- Public Re-exports ---

pub use client::{ApiClient, ApiError, Outcome};
pub use config::AppConfig;
pub use continuation::{ContinuationRouter, Intent, RouterState};
pub use redirect_guard::RedirectGuard;
pub use storage::{KeyValueStore, MemoryStore, SessionStores, StoreState};
pub use transport::{AccessLevel, HttpTransport, ReqwestTransport, TransportError};

/// AppState
///
/// The single container shared by every request: configuration, the pooled
/// backend HTTP client and the browser-session stores.
#[derive(Clone)]
pub struct AppState {
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
    /// Backend client: connection pool shared by every per-request transport.
    pub backend: reqwest::Client,
    /// Tab-scoped client state, keyed by browser session.
    pub sessions: Arc<SessionStores>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, TransportError> {
        let backend = ReqwestTransport::build_client(config.http_timeout)?;
        let sessions = Arc::new(SessionStores::new(config.session_idle));
        Ok(Self {
            config,
            backend,
            sessions,
        })
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for Arc<SessionStores> {
    fn from_ref(app_state: &AppState) -> Arc<SessionStores> {
        app_state.sessions.clone()
    }
}

/// create_router
///
/// Assembles the web shell: public routes as-is, flow routes behind the
/// browser-session layer, everything wrapped in request-id and tracing layers.
pub fn create_router(state: AppState) -> Router {
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(public::public_routes())
        // Flow routes: every handler receives the request's BrowserSession.
        .merge(flow::flow_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::session_middleware,
        )))
        .with_state(state);

    base_router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Span for one shell request, correlated by `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
