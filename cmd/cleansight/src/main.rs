//! # CleanSight server binary
//!
//! Assembles the in-memory store, the services, and the HTTP router, then
//! serves until interrupted. When a snapshot path is configured the store is
//! loaded from it at startup and written back on shutdown.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::AppState;
use configs::AppConfig;
use services::aggregate::AggregatorService;
use services::lifecycle::LifecycleService;
use services::matching::MatchingService;
use services::redemption::RedemptionService;
use storage_adapters::MemoryStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::load().context("loading configuration")?;
    init_tracing(cfg.log_json);

    let store = Arc::new(match &cfg.store.snapshot_path {
        Some(path) => MemoryStore::load_or_default(path)
            .await
            .context("loading store snapshot")?,
        None => MemoryStore::new(),
    });

    let state = AppState {
        matching: Arc::new(MatchingService::new(
            store.clone(),
            store.clone(),
            store.clone(),
        )),
        lifecycle: Arc::new(LifecycleService::new(
            store.clone(),
            store.clone(),
            store.clone(),
        )),
        aggregator: Arc::new(AggregatorService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        )),
        redemption: Arc::new(RedemptionService::new(store.clone(), store.clone())),
    };

    let app = api_adapters::router(state);
    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(%addr, "🚀 CleanSight core listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(path) = &cfg.store.snapshot_path {
        store
            .save_to_file(path)
            .await
            .context("writing store snapshot")?;
        info!(path = %path.display(), "store snapshot written");
    }

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
