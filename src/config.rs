use std::env;
use std::time::Duration;

use crate::messages::Locale;

/// ConfigError
///
/// Raised by `AppConfig::load` when the environment cannot produce a complete,
/// valid configuration for the selected runtime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
    #[error("{name} is not a valid URL: {value}")]
    InvalidUrl { name: &'static str, value: String },
    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
}

/// AppConfig
///
/// Holds the web shell's entire configuration state. Immutable once loaded and
/// pulled into handlers via FromRef, like every other piece of the shared state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and which secrets are mandatory.
    pub env: Env,
    // Base URL of the assessment backend API.
    pub api_base_url: String,
    // Address the web shell binds to.
    pub bind_addr: String,
    // Upper bound for a single backend call.
    pub http_timeout: Duration,
    // Language of the messages the shell renders itself.
    pub locale: Locale,
    // Browser-session stores idle longer than this are dropped.
    pub session_idle: Duration,
    // Identity provider the /sso page hands off to.
    pub idp: IdpSettings,
}

/// IdpSettings
///
/// The SSO identity provider's authorization endpoint and client registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdpSettings {
    pub authorize_url: String,
    pub client_id: String,
    pub redirect_uri: String,
}

/// Env
///
/// The runtime context: local development with permissive defaults, or
/// production where every external endpoint must be configured explicitly.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_API_BASE_URL: &str = "http://localhost:8000";
const LOCAL_IDP_AUTHORIZE_URL: &str = "http://localhost:8000/sso/authorize";
const LOCAL_IDP_CLIENT_ID: &str = "skillcheck-local";
const LOCAL_IDP_REDIRECT_URI: &str = "http://localhost:3000/auth/callback";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SESSION_IDLE_MINUTES: u64 = 30;

impl Default for AppConfig {
    /// default
    ///
    /// A safe local configuration for test setup, requiring no environment variables.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: LOCAL_API_BASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            locale: Locale::Ko,
            session_idle: Duration::from_secs(DEFAULT_SESSION_IDLE_MINUTES * 60),
            idp: IdpSettings {
                authorize_url: LOCAL_IDP_AUTHORIZE_URL.to_string(),
                client_id: LOCAL_IDP_CLIENT_ID.to_string(),
                redirect_uri: LOCAL_IDP_REDIRECT_URI.to_string(),
            },
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables. In production the
    /// backend URL and the IdP registration are mandatory; locally they fall back
    /// to the development defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match var("APP_ENV").as_deref() {
            Some("production") => Env::Production,
            _ => Env::Local,
        };

        let required = |name: &'static str, local_default: &str| -> Result<String, ConfigError> {
            match (var(name), &env) {
                (Some(value), _) => Ok(value),
                (None, Env::Local) => Ok(local_default.to_string()),
                (None, Env::Production) => Err(ConfigError::Missing(name)),
            }
        };

        let api_base_url = url_var(
            "API_BASE_URL",
            required("API_BASE_URL", LOCAL_API_BASE_URL)?,
        )?;
        let idp = IdpSettings {
            authorize_url: url_var(
                "IDP_AUTHORIZE_URL",
                required("IDP_AUTHORIZE_URL", LOCAL_IDP_AUTHORIZE_URL)?,
            )?,
            client_id: required("IDP_CLIENT_ID", LOCAL_IDP_CLIENT_ID)?,
            redirect_uri: url_var(
                "IDP_REDIRECT_URI",
                var("IDP_REDIRECT_URI").unwrap_or_else(|| LOCAL_IDP_REDIRECT_URI.to_string()),
            )?,
        };

        let locale = match var("APP_LOCALE") {
            Some(raw) => Locale::parse(&raw).ok_or(ConfigError::Invalid {
                name: "APP_LOCALE",
                value: raw,
            })?,
            None => Locale::Ko,
        };

        Ok(Self {
            env,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            http_timeout: Duration::from_secs(number_var(
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            locale,
            session_idle: Duration::from_secs(
                number_var("SESSION_IDLE_MINUTES", DEFAULT_SESSION_IDLE_MINUTES)? * 60,
            ),
            idp,
        })
    }
}

/// Reads a variable, treating blank values as unset.
fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn url_var(name: &'static str, value: String) -> Result<String, ConfigError> {
    match url::Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(value),
        _ => Err(ConfigError::InvalidUrl { name, value }),
    }
}

fn number_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match var(name) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}
