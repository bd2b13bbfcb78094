//! Intent continuation: the `/continue` rendezvous page and its per-intent handlers.
//!
//! A page action sends the user to `/continue?intent=...`. If a handler hits a
//! recoverable auth failure the client detours through `/sso`, `/login` or
//! `/signup` with `returnTo` pointing back at the same `/continue` URL, so the
//! intent is re-run once the detour completes.

mod leveltest;
mod service_login;

pub use leveltest::handle_leveltest;
pub use service_login::handle_service_login;

use crate::{
    client::ApiError,
    messages::{Locale, messages},
    navigation::Navigation,
    scope::FlowScope,
};

pub const CONTINUE_PATH: &str = "/continue";
pub const ROOT_PATH: &str = "/";
pub const HOME_PATH: &str = "/home";
pub const CONSENT_PATH: &str = "/consent";
pub const TEST_START_PATH: &str = "/test/start";

/// Intent
///
/// The closed set of goals the continuation page can resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    ServiceLogin,
    Leveltest,
}

impl Intent {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "service_login" => Some(Self::ServiceLogin),
            "leveltest" => Some(Self::Leveltest),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ServiceLogin => "service_login",
            Self::Leveltest => "leveltest",
        }
    }
}

/// continuation_url
///
/// `/continue?intent=<intent>[&returnTo=<encoded return_to>]`: the way back to
/// this page after a detour, carrying the original destination along.
pub fn continuation_url(intent: Intent, return_to: Option<&str>) -> String {
    match return_to {
        Some(return_to) => format!(
            "{}?intent={}&returnTo={}",
            CONTINUE_PATH,
            intent.as_str(),
            urlencoding::encode(return_to)
        ),
        None => format!("{}?intent={}", CONTINUE_PATH, intent.as_str()),
    }
}

/// ContinueContext
///
/// Per-dispatch context. `return_to` is opaque: it is forwarded, never validated.
#[derive(Clone)]
pub struct ContinueContext {
    pub scope: FlowScope,
    pub return_to: Option<String>,
}

impl ContinueContext {
    /// `return_to` when supplied, otherwise `fallback`.
    pub fn destination_or(&self, fallback: &str) -> String {
        self.return_to
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// ContinueQuery
///
/// The two query parameters the page interprets; everything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContinueQuery {
    pub intent: Option<String>,
    pub return_to: Option<String>,
}

impl ContinueQuery {
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut parsed = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "intent" if parsed.intent.is_none() => parsed.intent = Some(value.into_owned()),
                "returnTo" if parsed.return_to.is_none() && !value.is_empty() => {
                    parsed.return_to = Some(value.into_owned())
                }
                _ => {}
            }
        }
        parsed
    }
}

/// RouterState
///
/// `Idle -> Dispatching -> Resumed | Failed`. Both terminal states are final for
/// this router instance; a fresh page visit is required to try again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterState {
    Idle,
    Dispatching,
    /// The page has been left through this navigation.
    Resumed(Navigation),
    /// The localized generic failure message to render, with a link home.
    Failed(String),
}

/// ContinuationRouter
///
/// The `/continue` page. One instance corresponds to one mounted page.
pub struct ContinuationRouter {
    scope: FlowScope,
    locale: Locale,
    last_signature: Option<String>,
    state: RouterState,
}

impl ContinuationRouter {
    pub fn new(scope: FlowScope, locale: Locale) -> Self {
        Self {
            scope,
            locale,
            last_signature: None,
            state: RouterState::Idle,
        }
    }

    pub fn state(&self) -> &RouterState {
        &self.state
    }

    /// enter
    ///
    /// Runs on mount and on every query-string change. A signature identical to
    /// the last one processed is ignored (the host may invoke setup twice for the
    /// same state). Returns whether a dispatch took place.
    pub async fn enter(&mut self, query: &str) -> bool {
        let signature = query.strip_prefix('?').unwrap_or(query).to_string();
        if self.last_signature.as_deref() == Some(signature.as_str()) {
            tracing::debug!(%signature, "Continuation already processed, skipping");
            return false;
        }
        self.last_signature = Some(signature);

        let query = ContinueQuery::parse(query);
        let intent = query.intent.as_deref().and_then(Intent::parse);

        let Some(intent) = intent else {
            tracing::warn!(intent = ?query.intent, "Unknown or missing intent, returning to root");
            let navigation = self.scope.navigate(Navigation::replace(ROOT_PATH));
            self.state = RouterState::Resumed(navigation);
            return true;
        };

        self.state = RouterState::Dispatching;
        tracing::info!(intent = intent.as_str(), return_to = ?query.return_to, "Dispatching intent");

        let ctx = ContinueContext {
            scope: self.scope.clone(),
            return_to: query.return_to,
        };
        let result: Result<Navigation, ApiError> = match intent {
            Intent::ServiceLogin => handle_service_login(&ctx).await,
            Intent::Leveltest => handle_leveltest(&ctx).await,
        };

        self.state = match result {
            Ok(navigation) => RouterState::Resumed(navigation),
            Err(e) => {
                tracing::error!(intent = intent.as_str(), error = %e, "Intent handler failed");
                RouterState::Failed(messages(self.locale).generic_failure.to_string())
            }
        };
        true
    }
}
