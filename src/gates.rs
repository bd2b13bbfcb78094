use crate::{
    client::{ApiError, Outcome},
    config::IdpSettings,
    continuation::{ContinueContext, ROOT_PATH, handle_service_login},
    messages::{Locale, messages},
    navigation::{Navigation, with_return_to},
    scope::FlowScope,
};

pub const AUTH_ERROR_PATH: &str = "/auth-error";
pub const SIGNUP_FORM_PATH: &str = "/signup/form";
pub const CALLBACK_PATH: &str = "/auth/callback";

/// GateResult
///
/// How a detour page ended: the page was left, or a message has to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateResult {
    Navigated(Navigation),
    Failed(String),
}

/// idp_authorize_url
///
/// The IdP authorization request. `returnTo` travels in `state` so the SSO
/// callback can send the user back to where the detour started.
pub fn idp_authorize_url(idp: &IdpSettings, return_to: &str) -> Result<String, url::ParseError> {
    let url = url::Url::parse_with_params(
        &idp.authorize_url,
        &[
            ("client_id", idp.client_id.as_str()),
            ("redirect_uri", idp.redirect_uri.as_str()),
            ("response_type", "code"),
            ("state", return_to),
        ],
    )?;
    Ok(url.to_string())
}

/// sso_gate
///
/// The `/sso` page.
/// 1. Already authenticated: the loop is over, reset the guard and resume.
/// 2. Otherwise one redirect attempt is recorded; at the threshold the user is
///    sent to the auth error page instead of bouncing to the IdP again.
/// 3. Otherwise a full navigation to the IdP.
pub async fn sso_gate(
    scope: &FlowScope,
    idp: &IdpSettings,
    return_to: Option<&str>,
    locale: Locale,
) -> GateResult {
    let return_to = return_to.unwrap_or(ROOT_PATH);

    let authenticated = match scope.api.auth_status().await {
        Outcome::Resolved(status) => status.authenticated,
        // Anonymous callers get 401 from the status endpoint.
        Outcome::Rejected(ApiError::Http { status: 401, .. }) => false,
        Outcome::Redirected(navigation) => return GateResult::Navigated(navigation),
        Outcome::Rejected(e) => {
            tracing::error!(error = %e, "SSO status check failed");
            return GateResult::Failed(messages(locale).sso_failure.to_string());
        }
    };

    if authenticated {
        scope.guard.reset();
        tracing::info!(%return_to, "Already authenticated, resuming");
        return GateResult::Navigated(scope.navigate(Navigation::replace(return_to)));
    }

    let detection = scope.guard.detect();
    if detection.should_escalate {
        tracing::warn!(count = detection.count, "Escalating to auth error page");
        return GateResult::Navigated(scope.navigate(Navigation::replace(AUTH_ERROR_PATH)));
    }

    match idp_authorize_url(idp, return_to) {
        Ok(url) => GateResult::Navigated(scope.navigate(Navigation::assign(url))),
        Err(e) => {
            tracing::error!(error = %e, "Invalid IdP authorize URL");
            GateResult::Failed(messages(locale).sso_failure.to_string())
        }
    }
}

/// callback_gate
///
/// Where the IdP sends the browser back. `state` is the `returnTo` handed to the
/// IdP by `sso_gate`; the service login completes the round trip, resets the
/// guard and resumes it. An `error` from the IdP ends the flow without a login.
pub async fn callback_gate(
    scope: &FlowScope,
    state: Option<&str>,
    idp_error: Option<&str>,
    locale: Locale,
) -> GateResult {
    if let Some(idp_error) = idp_error {
        tracing::warn!(%idp_error, "IdP rejected the sign-in");
        return GateResult::Failed(messages(locale).sso_failure.to_string());
    }
    tracing::info!(state = ?state, "IdP round trip completed");
    login_gate(scope, state, locale).await
}

/// login_gate
///
/// The `/login` page: the `service_login` flow with an explicit `returnTo`.
/// Unlike the continuation page, the failure detail is shown.
pub async fn login_gate(scope: &FlowScope, return_to: Option<&str>, locale: Locale) -> GateResult {
    let ctx = ContinueContext {
        scope: scope.clone(),
        return_to: return_to.map(str::to_string),
    };
    match handle_service_login(&ctx).await {
        Ok(navigation) => GateResult::Navigated(navigation),
        Err(e) => {
            tracing::error!(error = %e, "Login failed");
            GateResult::Failed(format!("{} {}", messages(locale).login_failure, e))
        }
    }
}

/// signup_gate
///
/// The `/signup` entry: forces the SSO detour (via `private-auth`) before the
/// signup form is shown.
pub async fn signup_gate(scope: &FlowScope, return_to: Option<&str>, locale: Locale) -> GateResult {
    match scope.api.signup_check().await {
        Outcome::Resolved(_) => {
            let form = match return_to {
                Some(return_to) => with_return_to(SIGNUP_FORM_PATH, return_to),
                None => SIGNUP_FORM_PATH.to_string(),
            };
            GateResult::Navigated(scope.navigate(Navigation::replace(form)))
        }
        Outcome::Redirected(navigation) => GateResult::Navigated(navigation),
        Outcome::Rejected(e) => {
            tracing::error!(error = %e, "Signup check failed");
            GateResult::Failed(messages(locale).generic_failure.to_string())
        }
    }
}

/// retry_after_auth_error
///
/// The auth error page's "try again": the user asked for a fresh start, so the
/// loop counter is cleared before going back to the root.
pub fn retry_after_auth_error(scope: &FlowScope) -> Navigation {
    scope.guard.reset();
    scope.navigate(Navigation::replace(ROOT_PATH))
}
