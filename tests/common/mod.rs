#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, http::StatusCode, response::IntoResponse, routing::get, routing::post};
use serde_json::{Value, json};
use skillcheck_web::{
    navigation::CapturingNavigator,
    scope::FlowScope,
    storage::{MemoryStore, StoreState},
    transport::{ApiRequest, HttpTransport, RawResponse, TransportError, TransportState},
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

// --- Scripted Transport ---

/// ScriptedTransport
///
/// In-process stand-in for the backend: one canned response per path, and a
/// log of every request the flow sent. Unscripted paths answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, (u16, String)>>,
    sent: Mutex<Vec<ApiRequest>>,
    offline: bool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn respond(self, path: &str, status: u16, body: Value) -> Self {
        self.respond_raw(path, status, &body.to_string())
    }

    pub fn respond_raw(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.to_string()));
        self
    }

    pub fn sent_paths(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.path.clone())
            .collect()
    }

    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        if self.offline {
            return Err(TransportError("connection refused".to_string()));
        }
        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .get(&request.path)
            .cloned()
            .unwrap_or((404, r#"{"detail":"Not Found"}"#.to_string()));
        Ok(RawResponse {
            status,
            body: body.into_bytes(),
        })
    }
}

// --- Flow Harness ---

/// Harness
///
/// A flow scope wired to a scripted backend, a capturing navigator and an
/// in-memory tab store, with handles kept for assertions.
pub struct Harness {
    pub scope: FlowScope,
    pub transport: Arc<ScriptedTransport>,
    pub navigator: Arc<CapturingNavigator>,
    pub store: StoreState,
}

impl Harness {
    pub fn new(transport: ScriptedTransport, location: &str) -> Self {
        Self::with_store(transport, location, MemoryStore::shared())
    }

    pub fn with_store(transport: ScriptedTransport, location: &str, store: StoreState) -> Self {
        let transport = Arc::new(transport);
        let navigator = CapturingNavigator::shared(location);
        let scope = FlowScope::new(
            transport.clone() as TransportState,
            navigator.clone(),
            store.clone(),
        );
        Self {
            scope,
            transport,
            navigator,
            store,
        }
    }

    pub fn targets(&self) -> Vec<String> {
        self.navigator
            .navigations()
            .into_iter()
            .map(|navigation| navigation.target)
            .collect()
    }
}

pub fn consent(consented: bool) -> Value {
    json!({ "consented": consented, "consent_at": if consented { json!("2025-11-11T00:00:00") } else { Value::Null } })
}

pub fn nickname(nickname: Option<&str>) -> Value {
    json!({ "user_id": 1, "nickname": nickname, "registered_at": null, "updated_at": null })
}

pub fn login_ok() -> Value {
    json!({ "access_token": "jwt", "token_type": "bearer", "user_id": 1, "is_new_user": false })
}

pub fn need(code: &str) -> Value {
    json!({ "detail": format!("{} required", code), "code": code })
}

// --- Fake Backend Server ---

/// spawn_backend
///
/// Binds a router on an ephemeral port and returns its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

/// FakeBackend
///
/// Per-endpoint status and body served by `fake_backend_router`, plus the
/// `Cookie` header each request arrived with.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub routes: Arc<Mutex<HashMap<String, (u16, Value)>>>,
    pub cookies_seen: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl FakeBackend {
    pub fn set(&self, path: &str, status: u16, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body));
    }

    pub fn cookie_for(&self, path: &str) -> Option<Option<String>> {
        self.cookies_seen
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(seen, _)| seen == path)
            .map(|(_, cookie)| cookie.clone())
    }

    pub fn hits(&self, path: &str) -> usize {
        self.cookies_seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(seen, _)| seen == path)
            .count()
    }

    pub fn router(&self) -> Router {
        let endpoints = [
            ("/api/auth/status", false),
            ("/api/auth/login", true),
            ("/api/auth/signup-check", false),
            ("/api/profile/consent", false),
            ("/api/profile/nickname", false),
            ("/raw/text-error", false),
        ];
        let mut router = Router::new();
        for (path, is_post) in endpoints {
            let backend = self.clone();
            let handler = move |headers: axum::http::HeaderMap| {
                let backend = backend.clone();
                async move { backend.answer(path, &headers) }
            };
            router = if is_post {
                router.route(path, post(handler))
            } else {
                router.route(path, get(handler))
            };
        }
        router
    }

    fn answer(&self, path: &str, headers: &axum::http::HeaderMap) -> axum::response::Response {
        let cookie = headers
            .get(axum::http::header::COOKIE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.cookies_seen
            .lock()
            .unwrap()
            .push((path.to_string(), cookie));

        if path == "/raw/text-error" {
            return (StatusCode::BAD_GATEWAY, "upstream exploded").into_response();
        }

        let (status, body) = self
            .routes
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or((404, json!({ "detail": "Not Found" })));
        (
            StatusCode::from_u16(status).unwrap(),
            axum::Json(body),
        )
            .into_response()
    }
}
