//! HR Bridge API server entry point.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use hrbridge_api::config::Config;
use hrbridge_api::error::AppError;
use hrbridge_api::state::AppState;
use hrbridge_core::case::CaseClient;
use hrbridge_core::clock::{Clock, SystemClock};
use hrbridge_core::risk::RiskPolicy;
use hrbridge_core::store::EventStore;
use hrbridge_core::sync::SyncAdapter;
use hrbridge_pega::PegaClient;
use hrbridge_processor::{
    BadgeAccessAdapter, EmployeeDirectoryAdapter, EventProcessor, JobQueue, NotificationAdapter,
};
use hrbridge_store::SqliteEventStore;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting HR Bridge API server");

    let config = Config::from_env()?;

    // Create the database pool, creating the database file on first run.
    let connect_options = SqliteConnectOptions::from_str(&format!(
        "sqlite://{}",
        config.database_path
    ))
    .map_err(|err| AppError::Config(format!("invalid database path: {err}")))?
    .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(connect_options)
        .await?;
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|err| AppError::Config(format!("migration failed: {err}")))?;

    // Wire the components.
    let store: Arc<dyn EventStore> = Arc::new(SqliteEventStore::new(pool));
    let case_client: Arc<dyn CaseClient> = Arc::new(
        PegaClient::new(config.pega.clone())
            .map_err(|err| AppError::Config(format!("failed to build Pega client: {err}")))?,
    );
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let adapters: Vec<Arc<dyn SyncAdapter>> = vec![
        Arc::new(EmployeeDirectoryAdapter),
        Arc::new(BadgeAccessAdapter),
        Arc::new(NotificationAdapter),
    ];
    let processor = Arc::new(EventProcessor::new(
        Arc::clone(&store),
        Arc::clone(&case_client),
        adapters,
        RiskPolicy::default(),
        Arc::clone(&clock),
        config.processor.clone(),
    ));
    let jobs = JobQueue::start(Arc::clone(&processor));
    let app_state = AppState::new(store, case_client, clock, processor, jobs);

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = hrbridge_api::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|err| AppError::Config(format!("invalid HOST:PORT combination: {err}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
