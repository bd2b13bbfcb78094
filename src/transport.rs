use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;

/// AccessLevel
///
/// The trust requirement every outbound request declares:
/// - `Public`: no credentials attached; failures never trigger redirects.
/// - `PrivateAuth`: credentials attached; only identity proof is required.
/// - `PrivateMember`: credentials attached; identity proof AND completed registration.
///
/// Call sites always pass the level explicitly. `Default` exists only for
/// generic construction and resolves to the strictest private level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessLevel {
    Public,
    PrivateAuth,
    #[default]
    PrivateMember,
}

impl AccessLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::PrivateAuth => "private-auth",
            Self::PrivateMember => "private-member",
        }
    }

    /// Whether stored session credentials travel with the request.
    pub fn attaches_credentials(self) -> bool {
        !matches!(self, Self::Public)
    }

    /// Whether recoverable auth failures may be answered with a redirect.
    pub fn may_redirect(self) -> bool {
        !matches!(self, Self::Public)
    }
}

/// HttpMethod
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
        }
    }
}

/// ApiRequest
///
/// A fully described outbound call. `path` is relative to the backend base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub access_level: AccessLevel,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>, access_level: AccessLevel) -> Self {
        Self {
            method,
            path: path.into(),
            access_level,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>, access_level: AccessLevel) -> Self {
        Self::new(HttpMethod::Get, path, access_level)
    }

    pub fn post(path: impl Into<String>, access_level: AccessLevel) -> Self {
        Self::new(HttpMethod::Post, path, access_level)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// RawResponse
///
/// What came back over the wire, before any classification.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// TransportError
///
/// A network-level failure: no HTTP response was received at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("network request failed: {0}")]
pub struct TransportError(pub String);

// 1. HttpTransport Contract
/// HttpTransport
///
/// Moves one `ApiRequest` over the network. Implementations are responsible for
/// credential attachment (honouring `AccessLevel::attaches_credentials`); they
/// never interpret status codes.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError>;
}

pub type TransportState = Arc<dyn HttpTransport>;

// 2. The Real Implementation
/// ReqwestTransport
///
/// JSON-over-HTTP transport. The browser's session credential (its `Cookie`
/// header, as received by the web shell) is forwarded on private calls only.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<HeaderValue>,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
        }
    }

    /// build_client
    ///
    /// The shared `reqwest::Client` for backend calls. The flow itself does not
    /// bound request time, so the timeout is applied here.
    pub fn build_client(timeout: Duration) -> Result<reqwest::Client, TransportError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TransportError(e.to_string()))
    }

    /// Attaches the session credential. Values that are not valid header bytes are dropped.
    pub fn with_credentials(mut self, cookie_header: Option<&str>) -> Self {
        self.credentials = cookie_header.and_then(|raw| HeaderValue::from_str(raw).ok());
        self
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn headers_for(&self, request: &ApiRequest) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in &request.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping malformed request header"),
            }
        }

        // Credentials are decided by the access level alone; a caller-supplied
        // cookie header never leaks onto a public call.
        headers.remove(COOKIE);
        if request.access_level.attaches_credentials() {
            if let Some(credentials) = &self.credentials {
                headers.insert(COOKIE, credentials.clone());
            }
        }
        headers
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        let url = self.url_for(&request.path);
        tracing::debug!(
            method = ?request.method,
            %url,
            access_level = request.access_level.as_str(),
            "Sending backend request"
        );

        let mut builder = self
            .client
            .request(request.method.as_reqwest(), &url)
            .headers(self.headers_for(request));
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> ReqwestTransport {
        ReqwestTransport::new(reqwest::Client::new(), "http://backend.local/")
            .with_credentials(Some("session=abc"))
    }

    #[test]
    fn public_requests_never_carry_cookies() {
        let request = ApiRequest::get("/api/auth/status", AccessLevel::Public)
            .with_header("Cookie", "smuggled=1");
        let headers = transport().headers_for(&request);
        assert!(headers.get(COOKIE).is_none());
    }

    #[test]
    fn private_requests_carry_the_session_cookie() {
        for level in [AccessLevel::PrivateAuth, AccessLevel::PrivateMember] {
            let headers = transport().headers_for(&ApiRequest::get("/api/profile/consent", level));
            assert_eq!(headers.get(COOKIE).unwrap(), "session=abc");
        }
    }

    #[test]
    fn url_joins_base_and_path() {
        let transport = transport();
        assert_eq!(
            transport.url_for("/api/auth/login"),
            "http://backend.local/api/auth/login"
        );
        assert_eq!(
            transport.url_for("api/auth/login"),
            "http://backend.local/api/auth/login"
        );
    }

    #[test]
    fn default_access_level_is_private_member() {
        assert_eq!(AccessLevel::default(), AccessLevel::PrivateMember);
        assert!(!AccessLevel::Public.attaches_credentials());
        assert!(!AccessLevel::Public.may_redirect());
    }
}
