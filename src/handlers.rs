use crate::{
    AppState,
    continuation::{ContinuationRouter, RouterState},
    gates::{self, GateResult},
    messages::{Locale, messages},
    models::SessionHint,
    navigation::{CapturingNavigator, Navigation},
    scope::FlowScope,
    session::{BrowserSession, forwarded_credentials},
    transport::{ReqwestTransport, TransportState},
    views,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header::LOCATION},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

// --- Query Structs ---

/// ReturnToQuery
///
/// The only query parameter the detour pages interpret.
#[derive(Deserialize, Default)]
pub struct ReturnToQuery {
    #[serde(rename = "returnTo")]
    pub return_to: Option<String>,
}

impl ReturnToQuery {
    fn return_to(&self) -> Option<&str> {
        non_empty(&self.return_to)
    }
}

/// CallbackQuery
///
/// What the IdP appends when it sends the browser back: the `state` it was given,
/// or an `error`.
#[derive(Deserialize, Default)]
pub struct CallbackQuery {
    pub state: Option<String>,
    pub error: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

// --- Flow Wiring ---

/// flow_scope
///
/// Builds the per-request flow: the backend transport carries the browser's
/// cookies, the navigator captures where the flow decides to go, and the store
/// is this browser session's.
fn flow_scope(
    state: &AppState,
    session: &BrowserSession,
    headers: &HeaderMap,
    uri: &Uri,
) -> FlowScope {
    let location = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let navigator = CapturingNavigator::shared(location);

    let transport = Arc::new(
        ReqwestTransport::new(state.backend.clone(), &state.config.api_base_url)
            .with_credentials(forwarded_credentials(headers).as_deref()),
    ) as TransportState;

    FlowScope::new(transport, navigator, session.store.clone())
}

/// navigate_to
///
/// A flow navigation becomes a 303 to its target: full and client-side
/// navigations look the same to the browser here. A target that cannot be a
/// `Location` header (control characters from a caller-supplied `returnTo`)
/// renders the failure page instead.
fn navigate_to(navigation: &Navigation, locale: Locale) -> Response {
    match HeaderValue::from_str(&navigation.target) {
        Ok(location) => (StatusCode::SEE_OTHER, [(LOCATION, location)]).into_response(),
        Err(_) => {
            tracing::warn!(target_path = ?navigation.target, "Navigation target is not a valid Location");
            failure_page(messages(locale).generic_failure, locale)
        }
    }
}

fn gate_response(result: GateResult, locale: Locale) -> Response {
    match result {
        GateResult::Navigated(navigation) => navigate_to(&navigation, locale),
        GateResult::Failed(message) => failure_page(&message, locale),
    }
}

// --- Handlers ---

/// continue_intent
///
/// `GET /continue?intent=...&returnTo=...`: one mount of the continuation page.
pub async fn continue_intent(
    State(state): State<AppState>,
    Extension(session): Extension<BrowserSession>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let scope = flow_scope(&state, &session, &headers, &uri);
    let mut router = ContinuationRouter::new(scope, state.config.locale);
    router.enter(uri.query().unwrap_or("")).await;

    match router.state() {
        RouterState::Resumed(navigation) => navigate_to(navigation, state.config.locale),
        RouterState::Failed(message) => failure_page(message, state.config.locale),
        RouterState::Idle | RouterState::Dispatching => {
            failure_page(messages(state.config.locale).generic_failure, state.config.locale)
        }
    }
}

/// sso
///
/// `GET /sso?returnTo=...`: the SSO detour destination.
pub async fn sso(
    State(state): State<AppState>,
    Extension(session): Extension<BrowserSession>,
    Query(query): Query<ReturnToQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let scope = flow_scope(&state, &session, &headers, &uri);
    let result = gates::sso_gate(
        &scope,
        &state.config.idp,
        query.return_to(),
        state.config.locale,
    )
    .await;
    gate_response(result, state.config.locale)
}

/// login
///
/// `GET /login?returnTo=...`: the login detour destination.
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<BrowserSession>,
    Query(query): Query<ReturnToQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let scope = flow_scope(&state, &session, &headers, &uri);
    let result = gates::login_gate(&scope, query.return_to(), state.config.locale).await;
    gate_response(result, state.config.locale)
}

/// signup
///
/// `GET /signup?returnTo=...`: gate in front of the signup form.
pub async fn signup(
    State(state): State<AppState>,
    Extension(session): Extension<BrowserSession>,
    Query(query): Query<ReturnToQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let scope = flow_scope(&state, &session, &headers, &uri);
    let result = gates::signup_gate(&scope, query.return_to(), state.config.locale).await;
    gate_response(result, state.config.locale)
}

/// auth_callback
///
/// `GET /auth/callback?state=...`: the IdP's redirect URI.
pub async fn auth_callback(
    State(state): State<AppState>,
    Extension(session): Extension<BrowserSession>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let scope = flow_scope(&state, &session, &headers, &uri);
    let result = gates::callback_gate(
        &scope,
        non_empty(&query.state),
        non_empty(&query.error),
        state.config.locale,
    )
    .await;
    gate_response(result, state.config.locale)
}

/// retry_auth
///
/// `GET|POST /auth-error/retry`: the user-initiated "try again".
pub async fn retry_auth(
    State(state): State<AppState>,
    Extension(session): Extension<BrowserSession>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let scope = flow_scope(&state, &session, &headers, &uri);
    tracing::info!(session = %session.id, "User retried after auth error");
    navigate_to(
        &gates::retry_after_auth_error(&scope),
        state.config.locale,
    )
}

/// session_hint
///
/// `GET /session/hint`: the optimistic nickname hint, refreshed best-effort.
/// The scope's navigator is never turned into a response, so a detour the
/// refresh would cause is dropped.
pub async fn session_hint(
    State(state): State<AppState>,
    Extension(session): Extension<BrowserSession>,
    headers: HeaderMap,
    uri: Uri,
) -> Json<SessionHint> {
    let scope = flow_scope(&state, &session, &headers, &uri);
    let nickname = scope.hints.prefetch_nickname(&scope.api).await;
    Json(SessionHint { nickname })
}

/// auth_error
///
/// `GET /auth-error`: where the redirect-loop guard sends the user.
pub async fn auth_error(State(state): State<AppState>) -> Html<String> {
    Html(views::render_auth_error(state.config.locale))
}

// --- Rendering ---

fn failure_page(message: &str, locale: Locale) -> Response {
    (StatusCode::OK, Html(views::render_failure(locale, message))).into_response()
}
