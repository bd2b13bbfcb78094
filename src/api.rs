use crate::{
    client::{ApiClient, ApiError, Outcome},
    models::{AuthStatus, ConsentStatus, LoginRequest, LoginResponse, NicknameProfile},
    transport::{AccessLevel, ApiRequest},
};

/// Backend endpoint paths consumed by the flow.
pub mod paths {
    pub const AUTH_STATUS: &str = "/api/auth/status";
    pub const AUTH_LOGIN: &str = "/api/auth/login";
    pub const AUTH_SIGNUP_CHECK: &str = "/api/auth/signup-check";
    pub const PROFILE_CONSENT: &str = "/api/profile/consent";
    pub const PROFILE_NICKNAME: &str = "/api/profile/nickname";
}

/// BackendApi
///
/// Typed access to the server contract. Each method pins the access level the
/// endpoint requires; callers cannot pick a different one.
#[derive(Clone)]
pub struct BackendApi {
    client: ApiClient,
}

impl BackendApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// auth_status
    ///
    /// [Public] Whether the browser currently holds a valid SSO session. The
    /// backend answers 401 `{authenticated:false}` for anonymous callers, which
    /// surfaces here as `Rejected` with status 401 and never as a redirect.
    pub async fn auth_status(&self) -> Outcome<AuthStatus> {
        self.client
            .request_json(ApiRequest::get(paths::AUTH_STATUS, AccessLevel::Public))
            .await
    }

    /// login
    ///
    /// [Private-Auth] Exchanges the SSO session for a service session. The
    /// backend checks identity first (401 NEED_SSO) and membership second
    /// (403 NEED_SIGNUP).
    pub async fn login(&self) -> Outcome<LoginResponse> {
        let body = match serde_json::to_value(LoginRequest::default()) {
            Ok(body) => body,
            Err(e) => return Outcome::Rejected(ApiError::Decode(e.to_string())),
        };
        self.client
            .request_json(
                ApiRequest::post(paths::AUTH_LOGIN, AccessLevel::PrivateAuth).with_body(body),
            )
            .await
    }

    /// signup_check
    ///
    /// [Private-Auth] Used only to force the SSO gate before the signup form is shown.
    pub async fn signup_check(&self) -> Outcome<AuthStatus> {
        self.client
            .request_json(ApiRequest::get(
                paths::AUTH_SIGNUP_CHECK,
                AccessLevel::PrivateAuth,
            ))
            .await
    }

    /// [Private-Auth] Privacy consent state.
    pub async fn consent_status(&self) -> Outcome<ConsentStatus> {
        self.client
            .request_json(ApiRequest::get(
                paths::PROFILE_CONSENT,
                AccessLevel::PrivateAuth,
            ))
            .await
    }

    /// [Private-Auth] Registration state; a missing nickname means signup is incomplete.
    pub async fn nickname(&self) -> Outcome<NicknameProfile> {
        self.client
            .request_json(ApiRequest::get(
                paths::PROFILE_NICKNAME,
                AccessLevel::PrivateAuth,
            ))
            .await
    }
}
