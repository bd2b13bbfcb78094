use serde::{Deserialize, Serialize};
use ts_rs::TS;

// --- Error Envelope ---

/// ErrorCode
///
/// Machine-readable reason attached to a non-2xx response by the backend.
/// When present it takes precedence over the raw HTTP status for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NeedSso,
    NeedLogin,
    NeedSignup,
    Forbidden,
}

impl ErrorCode {
    /// Parses the wire value. Unknown codes are treated as absent.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "NEED_SSO" => Some(Self::NeedSso),
            "NEED_LOGIN" => Some(Self::NeedLogin),
            "NEED_SIGNUP" => Some(Self::NeedSignup),
            "FORBIDDEN" => Some(Self::Forbidden),
            _ => None,
        }
    }
}

/// ErrorEnvelope
///
/// The body shape of every non-2xx backend response: `{ detail, code }`.
/// `code` is kept as the raw string so that codes this client does not know
/// about never break envelope parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorEnvelope {
    /// from_body
    ///
    /// Parses a response body into an envelope. A body that is not JSON, or JSON
    /// without the envelope shape, becomes the synthetic `{ detail: "HTTP <status>", code: null }`.
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<ErrorEnvelope>(body) {
            Ok(mut envelope) => {
                if envelope.detail.is_empty() {
                    envelope.detail = format!("HTTP {}", status);
                }
                envelope
            }
            Err(_) => Self::synthetic(status),
        }
    }

    pub fn synthetic(status: u16) -> Self {
        Self {
            detail: format!("HTTP {}", status),
            code: None,
        }
    }

    /// The parsed machine-readable code, if the server sent a known one.
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.code.as_deref().and_then(ErrorCode::parse)
    }
}

// --- Server Contract (Response Schemas) ---

/// UserId
///
/// The backend emits numeric ids from its database but older revisions of the
/// contract documented them as strings; both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

/// AuthStatus
///
/// Response of `GET /api/auth/status` (public) and `GET /api/auth/signup-check` (private-auth).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knox_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

/// LoginRequest
///
/// Body of `POST /api/auth/login`. Identity is proven by the session cookie, so
/// the body is empty; it exists to keep the wire shape explicit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginRequest {}

/// LoginResponse
///
/// Response of `POST /api/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_id: UserId,
    pub is_new_user: bool,
}

/// ConsentStatus
///
/// Response of `GET /api/profile/consent`. Timestamps are passed through as the
/// server formatted them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConsentStatus {
    pub consented: bool,
    #[serde(default)]
    pub consent_at: Option<String>,
}

/// NicknameProfile
///
/// Response of `GET /api/profile/nickname`. A `null` nickname means the user has
/// not completed registration yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NicknameProfile {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub registered_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl NicknameProfile {
    /// The nickname, treating an empty string the same as a missing one.
    pub fn registered_nickname(&self) -> Option<&str> {
        self.nickname.as_deref().filter(|nickname| !nickname.trim().is_empty())
    }
}

/// SessionHint
///
/// Payload of the web shell's `GET /session/hint`: the optimistic nickname hint
/// used by the front-end to avoid header flicker. Never trusted for gating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionHint {
    pub nickname: Option<String>,
}
