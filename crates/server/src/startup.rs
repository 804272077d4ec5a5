use std::net::SocketAddr;

use axum::Router;
use configs::{AppConfig, StorageConfig};
use service::{
    file::{FileClientStore, FileDriverStore},
    ledger::LedgerService,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open both JSON stores under the configured data directory, creating
/// empty documents where missing.
pub async fn build_state(storage: &StorageConfig) -> Result<AppState, StartupError> {
    common::env::ensure_data_dir(&storage.data_dir).await?;

    let drivers = FileDriverStore::new(storage.drivers_path()).await?;
    let clients = FileClientStore::new(storage.clients_path()).await?;
    info!(
        drivers = %storage.drivers_path().display(),
        clients = %storage.clients_path().display(),
        "ledger storage ready"
    );

    let ledger = LedgerService::new(drivers, clients);
    Ok(AppState { ledger })
}

/// Build the router over file-backed storage.
pub async fn build_app(storage: &StorageConfig) -> Result<Router, StartupError> {
    let state = build_state(storage).await?;
    Ok(routes::build_router(state, build_cors()))
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let addr = cfg.bind_addr();
    addr.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address {addr}: {e}")))
}

/// Public entry: build the app and run the HTTP server until `shutdown` resolves
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = build_app(&cfg.storage).await?;

    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "booking ledger listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}
