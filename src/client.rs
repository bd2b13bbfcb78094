use serde::de::DeserializeOwned;

use crate::{
    models::{ErrorCode, ErrorEnvelope},
    navigation::{Navigation, NavigatorState, with_return_to},
    transport::{AccessLevel, ApiRequest, TransportError, TransportState},
};

pub const SSO_PATH: &str = "/sso";
pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";

/// ApiError
///
/// Every failure a caller can observe. Recoverable auth failures never appear
/// here; they become `Outcome::Redirected`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// 403 with `FORBIDDEN`: terminal, shown to the user as-is.
    #[error("{detail}")]
    Forbidden { detail: String },
    /// Any other non-2xx response.
    #[error("{detail}")]
    Http { status: u16, detail: String },
    /// No response at all.
    #[error(transparent)]
    Network(#[from] TransportError),
    /// A 2xx body that does not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Forbidden { .. } => Some(403),
            Self::Http { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }
}

/// Outcome
///
/// The result of one backend call.
/// - `Resolved`: 2xx with a well-formed body.
/// - `Redirected`: a recoverable auth failure; the navigation has already been
///   handed to the navigator and the caller must stop.
/// - `Rejected`: a failure the caller has to surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Resolved(T),
    Redirected(Navigation),
    Rejected(ApiError),
}

impl<T> Outcome<T> {
    pub fn resolved(self) -> Option<T> {
        match self {
            Self::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_redirected(&self) -> bool {
        matches!(self, Self::Redirected(_))
    }
}

/// Classification
///
/// What a non-2xx response means for the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Detour through one of the auth pages, carrying `returnTo`.
    Detour(&'static str),
    Reject(ApiError),
}

/// classify
///
/// Status and code are evaluated jointly; the code takes precedence over the
/// status alone. Public requests never detour.
pub fn classify(access_level: AccessLevel, status: u16, envelope: ErrorEnvelope) -> Classification {
    let code = envelope.error_code();

    if access_level.may_redirect() {
        match (status, code) {
            (401, Some(ErrorCode::NeedSso)) => return Classification::Detour(SSO_PATH),
            (401, Some(ErrorCode::NeedLogin)) => return Classification::Detour(LOGIN_PATH),
            (403, Some(ErrorCode::NeedSignup)) => return Classification::Detour(SIGNUP_PATH),
            _ => {}
        }
    }

    match (status, code) {
        (403, Some(ErrorCode::Forbidden)) => Classification::Reject(ApiError::Forbidden {
            detail: envelope.detail,
        }),
        _ => Classification::Reject(ApiError::Http {
            status,
            detail: envelope.detail,
        }),
    }
}

/// ApiClient
///
/// The access-level-aware client. It owns no mutable state: the transport
/// carries the session credential and the navigator knows the current page.
#[derive(Clone)]
pub struct ApiClient {
    transport: TransportState,
    navigator: NavigatorState,
}

impl ApiClient {
    pub fn new(transport: TransportState, navigator: NavigatorState) -> Self {
        Self {
            transport,
            navigator,
        }
    }

    /// request
    ///
    /// Sends the request and classifies the response. On a detour the full-page
    /// navigation is performed here, with `returnTo` computed from the location
    /// at failure time.
    pub async fn request(&self, request: ApiRequest) -> Outcome<serde_json::Value> {
        self.request_json(request).await
    }

    /// request_json
    ///
    /// Typed variant of `request`: the 2xx body is deserialized into `T`.
    pub async fn request_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Outcome<T> {
        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(path = %request.path, error = %e, "Backend unreachable");
                return Outcome::Rejected(ApiError::Network(e));
            }
        };

        if response.is_success() {
            return match serde_json::from_slice::<T>(&response.body) {
                Ok(value) => Outcome::Resolved(value),
                Err(e) => {
                    tracing::error!(path = %request.path, error = %e, "Malformed success body");
                    Outcome::Rejected(ApiError::Decode(e.to_string()))
                }
            };
        }

        let envelope = ErrorEnvelope::from_body(response.status, &response.body);
        tracing::debug!(
            path = %request.path,
            status = response.status,
            code = ?envelope.code,
            access_level = request.access_level.as_str(),
            "Classifying backend failure"
        );

        match classify(request.access_level, response.status, envelope) {
            Classification::Detour(page) => {
                let return_to = self.navigator.current_location();
                let navigation = Navigation::assign(with_return_to(page, &return_to));
                tracing::info!(
                    path = %request.path,
                    status = response.status,
                    detour = page,
                    "Recoverable auth failure, leaving page"
                );
                self.navigator.navigate(&navigation);
                Outcome::Redirected(navigation)
            }
            Classification::Reject(error) => Outcome::Rejected(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(code: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            detail: "server says no".to_string(),
            code: code.map(str::to_string),
        }
    }

    #[test]
    fn detours_follow_status_and_code() {
        let level = AccessLevel::PrivateAuth;
        assert_eq!(
            classify(level, 401, envelope(Some("NEED_SSO"))),
            Classification::Detour(SSO_PATH)
        );
        assert_eq!(
            classify(level, 401, envelope(Some("NEED_LOGIN"))),
            Classification::Detour(LOGIN_PATH)
        );
        assert_eq!(
            classify(AccessLevel::PrivateMember, 403, envelope(Some("NEED_SIGNUP"))),
            Classification::Detour(SIGNUP_PATH)
        );
    }

    #[test]
    fn code_on_the_wrong_status_does_not_detour() {
        assert_eq!(
            classify(AccessLevel::PrivateAuth, 403, envelope(Some("NEED_SSO"))),
            Classification::Reject(ApiError::Http {
                status: 403,
                detail: "server says no".to_string()
            })
        );
    }

    #[test]
    fn forbidden_carries_detail() {
        let Classification::Reject(error) =
            classify(AccessLevel::PrivateMember, 403, envelope(Some("FORBIDDEN")))
        else {
            panic!("forbidden must reject");
        };
        assert_eq!(error.to_string(), "server says no");
        assert_eq!(error.status(), Some(403));
    }

    #[test]
    fn public_requests_never_detour() {
        for (status, code) in [(401, "NEED_SSO"), (401, "NEED_LOGIN"), (403, "NEED_SIGNUP")] {
            assert!(matches!(
                classify(AccessLevel::Public, status, envelope(Some(code))),
                Classification::Reject(ApiError::Http { .. })
            ));
        }
    }

    #[test]
    fn bare_401_without_code_rejects() {
        assert_eq!(
            classify(AccessLevel::PrivateAuth, 401, ErrorEnvelope::synthetic(401)),
            Classification::Reject(ApiError::Http {
                status: 401,
                detail: "HTTP 401".to_string()
            })
        );
    }
}
