//! Server setup and initialization
//!
//! Wires storage, change fan-out and services into an Axum application.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use manada_cache::{RedisChangePublisher, RedisPool};
use manada_common::{AppConfig, AppError, StorageBackend};
use manada_core::ChangePublisher;
use manada_db::{
    create_pool, run_migrations, DatabaseConfig, MemoryChangeBus, MemoryStore, PgAdRepository,
    PgDocumentRepository, PgMarkerRepository, PgMomentRepository, PgNotificationRepository,
};
use manada_service::{spawn_moment_sweeper, ServiceContextBuilder};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Application with the basic middleware stack (no rate limit, no CORS)
pub fn create_app(state: AppState) -> Router {
    apply_middleware(create_router())
        .merge(health_routes())
        .with_state(state)
}

/// Application with rate limiting and CORS taken from the state's config
pub fn create_app_with_config(state: AppState) -> Router {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    );
    api.merge(apply_middleware(health_routes())).with_state(state)
}

/// Initialize storage, change publisher and services
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let mut builder = ServiceContextBuilder::new().config(&config);

    builder = match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            let store = MemoryStore::new();
            builder
                .document_repo(Arc::new(store.clone()))
                .marker_repo(Arc::new(store.clone()))
                .notification_repo(Arc::new(store.clone()))
                .ad_repo(Arc::new(store.clone()))
                .moment_repo(Arc::new(store))
        }
        StorageBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .ok_or_else(|| AppError::Config("DATABASE_URL is required for postgres storage".to_string()))?;

            info!("Connecting to PostgreSQL...");
            let pool = create_pool(&DatabaseConfig::from(database))
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            run_migrations(&pool)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("PostgreSQL connection established");

            builder
                .pool(pool.clone())
                .document_repo(Arc::new(PgDocumentRepository::new(pool.clone())))
                .marker_repo(Arc::new(PgMarkerRepository::new(pool.clone())))
                .notification_repo(Arc::new(PgNotificationRepository::new(pool.clone())))
                .ad_repo(Arc::new(PgAdRepository::new(pool.clone())))
                .moment_repo(Arc::new(PgMomentRepository::new(pool)))
        }
    };

    let publisher: Arc<dyn ChangePublisher> = match &config.redis {
        Some(redis) => {
            info!("Connecting to Redis...");
            let redis_pool =
                RedisPool::from_config(redis).map_err(|e| AppError::Cache(e.to_string()))?;
            builder = builder.redis_pool(redis_pool.clone());
            Arc::new(RedisChangePublisher::new(redis_pool))
        }
        None => {
            info!("REDIS_URL not set; change events stay in process");
            Arc::new(MemoryChangeBus::new())
        }
    };

    let service_context = builder
        .publisher(publisher)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    info!(
        backend = ?config.storage.backend,
        consistency = ?service_context.consistency(),
        "Service context ready"
    );
    Ok(AppState::new(service_context, config))
}

/// Serve the application until Ctrl-C
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {e}")))?;
    let sweep_every = config.moments.sweep_interval_secs;

    let state = create_app_state(config).await?;

    let sweeper = (sweep_every > 0).then(|| {
        spawn_moment_sweeper(
            state.service_context().clone(),
            Duration::from_secs(sweep_every),
        )
    });

    let result = run_server(create_app_with_config(state), addr).await;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    result
}
