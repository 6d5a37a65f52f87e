use std::sync::Arc;

use configs::{AppConfig, RedisConfig};
use service::address::{AddressService, AddressStore, RedisAddressStore};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::errors::StartupError;
use crate::routes;

/// Shared handler state; the store connection is owned here and nowhere else.
#[derive(Clone)]
pub struct AppState {
    pub addresses: AddressService,
}

impl AppState {
    pub fn new(store: Arc<dyn AddressStore>) -> Self {
        Self { addresses: AddressService::new(store) }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Connect and PING the store. Any failure aborts startup; there is no retry.
pub async fn connect_store(cfg: &RedisConfig) -> Result<Arc<dyn AddressStore>, StartupError> {
    let store = RedisAddressStore::connect(&cfg.url, cfg.connect_timeout(), cfg.response_timeout())
        .await
        .map_err(|e| {
            error!(event = "store_unreachable", error = %e, "redis is not reachable");
            StartupError::StoreUnavailable(e)
        })?;
    Ok(Arc::new(store))
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(event = "shutdown_signal", "shutdown requested, draining in-flight requests");
}

/// Public entry: connect the store, serve until a shutdown signal, then release the store.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let store = connect_store(&cfg.redis).await?;
    let state = AppState::new(store);

    let app = routes::build_router(state, build_cors());

    let addr = cfg.server.bind_addr()?;
    info!(%addr, "starting address server");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // the router, and with it the last handle on the connection, is gone by now
    info!(event = "store_released", "store connection released");
    Ok(())
}
