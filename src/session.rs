use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::storage::{SessionStores, StoreState};

/// Name of the browser-session cookie that scopes the client state.
pub const SESSION_COOKIE: &str = "sid";

/// BrowserSession
///
/// The resolved browser session of a request, inserted as a request extension
/// by `session_middleware`.
#[derive(Clone)]
pub struct BrowserSession {
    pub id: String,
    pub store: StoreState,
}

/// session_middleware
///
/// Resolves the `sid` cookie to its tab-scoped store, minting a new session when
/// the cookie is missing or malformed. The cookie carries no `Max-Age`, so it
/// ends with the browser session and the state never outlives it.
pub async fn session_middleware(
    State(sessions): State<Arc<SessionStores>>,
    mut request: Request,
    next: Next,
) -> Response {
    let (id, is_new) = match session_id(request.headers()) {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };

    let store = sessions.open(&id);
    request.extensions_mut().insert(BrowserSession {
        id: id.clone(),
        store,
    });

    let mut response = next.run(request).await;

    if is_new {
        tracing::debug!(session = %id, "Started browser session");
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

/// Iterates `name=value` pairs over every `Cookie` header.
fn cookie_pairs(headers: &HeaderMap) -> impl Iterator<Item = (&str, &str)> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
}

/// The session id from the `sid` cookie, if it is a well-formed UUID.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    cookie_pairs(headers)
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
        .map(|id| id.to_string())
}

/// forwarded_credentials
///
/// The browser's cookies as a single `Cookie` header for the backend, without
/// the shell's own session cookie.
pub fn forwarded_credentials(headers: &HeaderMap) -> Option<String> {
    let forwarded = cookie_pairs(headers)
        .filter(|(name, _)| *name != SESSION_COOKIE)
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>();

    if forwarded.is_empty() {
        None
    } else {
        Some(forwarded.join("; "))
    }
}
