//! Car catalog HTTP service entry point.
//!
//! # Purpose
//! Loads configuration, builds the store, cache and service, optionally seeds
//! the catalog, then serves the API and the metrics endpoint until shutdown.
//!
//! # Notes
//! The `build_state` helper keeps wiring testable and minimizes main setup logic.
use anyhow::Context;
use catalog::app::{AppState, build_router};
use catalog::cache::ResponseCache;
use catalog::config::{self, CatalogConfig};
use catalog::observability;
use catalog::store::CatalogStore;
use catalog::store::memory::InMemoryStore;
use std::future::Future;
use std::sync::Arc;

const SERVICE_NAME: &str = "car-catalog";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CatalogConfig::from_env_or_yaml().context("catalog config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: CatalogConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability(SERVICE_NAME)?;
    let state = build_state(&config).await?;
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;
    tracing::info!(addr = %listener.local_addr()?, "car catalog listening");

    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {
            tracing::info!("shutdown requested");
        }
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

async fn build_state(config: &CatalogConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn CatalogStore + Send + Sync> = Arc::new(InMemoryStore::new());
    let cache = Arc::new(
        ResponseCache::new(config.cache_ttl, config.cache_invalidation)
            .with_max_entries(config.cache_max_entries),
    );
    let state = AppState::new(store, cache);

    if let Some(path) = &config.seed_file {
        let payloads = config::read_seed_file(path)?;
        let added = state
            .service
            .seed(payloads)
            .await
            .with_context(|| format!("seed catalog from {}", path.display()))?;
        tracing::info!(added, path = %path.display(), "catalog seeded");
    }
    Ok(state)
}
