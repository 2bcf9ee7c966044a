use drinks_api::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{RepositoryState, SqliteRepository},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, sets up logging, resets the database schema and serves
/// the HTTP API until the process is stopped.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail fast on anything missing)
    dotenv::dotenv().ok();
    let config = AppConfig::load().expect("FATAL: invalid configuration");

    // 2. Logging: RUST_LOG wins, otherwise local debugging defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "drinks_api=debug,tower_http=info,axum=trace".into());

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

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Database: connect, then drop and recreate the schema. Nothing persists
    // across restarts.
    let repo = SqliteRepository::connect(&config.db_url, config.db_max_connections)
        .await
        .expect("FATAL: Failed to open the database. Check DATABASE_URL.");
    repo.drop_and_create_all()
        .await
        .expect("FATAL: Failed to create the drink table.");
    let repo = Arc::new(repo) as RepositoryState;

    match (&config.auth.jwks_url, config.env == Env::Local) {
        (Some(url), _) => tracing::info!(jwks_url = %url, "verifying tokens against JWKS"),
        (None, true) => tracing::warn!("verifying tokens with the local HS256 secret"),
        (None, false) => tracing::error!("no token key source configured"),
    }

    // 4. Application context and router
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(repo, config));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener.");

    tracing::info!("Listening on {bind_addr}");

    axum::serve(listener, app).await.expect("FATAL: server error");
}
