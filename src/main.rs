use skillcheck_web::{
    AppState,
    config::{AppConfig, Env},
    create_router,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point of the web shell: configuration, logging, shared state, server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load().expect("FATAL: invalid configuration");

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise the flow logs at debug and the HTTP layer at info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "skillcheck_web=debug,tower_http=info".into());

    // 3. Log format per environment: pretty locally, JSON for the aggregator in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Web shell starting in {:?} mode", config.env);
    tracing::info!(api = %config.api_base_url, "Backend API configured");

    // 4. Shared State Assembly
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(config).expect("FATAL: failed to build backend HTTP client");

    // 5. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: failed to bind listener");

    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("FATAL: server terminated unexpectedly");
}
