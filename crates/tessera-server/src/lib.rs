//! # tessera-server
//!
//! HTTP glue around the `tessera-auth` protocol engine: an axum router for
//! the authorization and token endpoints plus a bearer-protected demo
//! resource, configuration loading, and process bootstrap. All protocol
//! decisions live in the engine; this crate only moves bytes in and out.

use std::sync::Arc;

use tessera_auth::{AuthorizationProvider, ResourceProvider};
use tessera_auth_redis::RedisStorage;

pub mod config;
pub mod observability;
pub mod routes;

pub use config::{ServerConfig, load_config};
pub use routes::AppState;

/// Builds the storage, providers, and router from configuration, then
/// serves until ctrl-c.
///
/// # Errors
///
/// Returns an error if the store is unreachable, a seed client cannot be
/// registered, or the listen address cannot be bound.
pub async fn run(cfg: ServerConfig) -> anyhow::Result<()> {
    let storage = RedisStorage::connect(&cfg.redis_url).await?;
    for client in &cfg.clients {
        storage.register_client(client).await?;
    }
    if !cfg.clients.is_empty() {
        tracing::info!(clients = cfg.clients.len(), "seeded client registrations");
    }

    let storage = Arc::new(storage);
    let provider = Arc::new(AuthorizationProvider::new(
        storage.clone(),
        storage.clone(),
        cfg.provider.to_provider_config(),
    ));
    let resources = Arc::new(ResourceProvider::new(storage));

    let app = routes::router(AppState {
        provider,
        resources,
    });

    let listener = tokio::net::TcpListener::bind(cfg.listen.as_str()).await?;
    tracing::info!(addr = %cfg.listen, "tessera authorization server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
