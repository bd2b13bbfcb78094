use serial_test::serial;
use skillcheck_web::{
    AppConfig,
    config::{ConfigError, Env},
    messages::Locale,
};
use std::time::Duration;
use std::{env, panic};

const CONFIG_VARS: [&str; 9] = [
    "APP_ENV",
    "API_BASE_URL",
    "IDP_AUTHORIZE_URL",
    "IDP_CLIENT_ID",
    "IDP_REDIRECT_URI",
    "BIND_ADDR",
    "HTTP_TIMEOUT_SECS",
    "APP_LOCALE",
    "SESSION_IDLE_MINUTES",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with exactly `vars` set (every other config variable unset),
/// then restores the original environment.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    unsafe {
        for (key, original_value) in originals {
            match original_value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(&[], AppConfig::load).expect("local config must load");

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base_url, "http://localhost:8000");
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.http_timeout, Duration::from_secs(10));
    assert_eq!(config.session_idle, Duration::from_secs(30 * 60));
    assert_eq!(config.locale, Locale::Ko);
    assert_eq!(config.idp.client_id, "skillcheck-local");
}

#[test]
#[serial]
fn test_app_config_production_requires_backend_url() {
    let result = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("IDP_AUTHORIZE_URL", "https://idp.example.com/authorize"),
            ("IDP_CLIENT_ID", "skillcheck"),
        ],
        AppConfig::load,
    );

    assert_eq!(result.unwrap_err(), ConfigError::Missing("API_BASE_URL"));
}

#[test]
#[serial]
fn test_app_config_production_requires_idp_client() {
    let result = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("API_BASE_URL", "https://api.example.com"),
            ("IDP_AUTHORIZE_URL", "https://idp.example.com/authorize"),
        ],
        AppConfig::load,
    );

    assert_eq!(result.unwrap_err(), ConfigError::Missing("IDP_CLIENT_ID"));
}

#[test]
#[serial]
fn test_app_config_production_success() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("API_BASE_URL", "https://api.example.com/"),
            ("IDP_AUTHORIZE_URL", "https://idp.example.com/authorize"),
            ("IDP_CLIENT_ID", "skillcheck"),
            ("IDP_REDIRECT_URI", "https://skillcheck.example.com/auth/callback"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("HTTP_TIMEOUT_SECS", "3"),
            ("APP_LOCALE", "en"),
            ("SESSION_IDLE_MINUTES", "5"),
        ],
        AppConfig::load,
    )
    .expect("production config must load");

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.api_base_url, "https://api.example.com");
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.http_timeout, Duration::from_secs(3));
    assert_eq!(config.session_idle, Duration::from_secs(300));
    assert_eq!(config.locale, Locale::En);
    assert_eq!(
        config.idp.redirect_uri,
        "https://skillcheck.example.com/auth/callback"
    );
}

#[test]
#[serial]
fn test_app_config_rejects_malformed_values() {
    let bad_url = run_with_env(&[("API_BASE_URL", "not a url")], AppConfig::load);
    assert!(matches!(
        bad_url,
        Err(ConfigError::InvalidUrl { name: "API_BASE_URL", .. })
    ));

    let bad_timeout = run_with_env(&[("HTTP_TIMEOUT_SECS", "soon")], AppConfig::load);
    assert_eq!(
        bad_timeout.unwrap_err(),
        ConfigError::Invalid {
            name: "HTTP_TIMEOUT_SECS",
            value: "soon".to_string()
        }
    );

    let bad_locale = run_with_env(&[("APP_LOCALE", "fr")], AppConfig::load);
    assert!(matches!(
        bad_locale,
        Err(ConfigError::Invalid { name: "APP_LOCALE", .. })
    ));
}

#[test]
#[serial]
fn test_blank_variables_count_as_unset() {
    let config = run_with_env(&[("API_BASE_URL", "   "), ("BIND_ADDR", "")], AppConfig::load)
        .expect("blank values fall back to defaults");

    assert_eq!(config.api_base_url, "http://localhost:8000");
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
}
