use crate::config::{RecordConfig, StoreBackend};
use crate::services::{ConnectionProvider, InMemoryRecordStore, MongoRecordStore, RecordStore};
use crate::{build_metrics_router, build_router, AppState};
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

pub struct Application {
    port: u16,
    metrics_port: u16,
    api_listener: TcpListener,
    metrics_listener: TcpListener,
    state: AppState,
}

impl Application {
    pub async fn build(config: RecordConfig) -> Result<Self, AppError> {
        let store = build_store(&config).await?;
        let state = AppState {
            config: config.clone(),
            store,
        };

        let api_listener = bind(config.common.port).await?;
        let metrics_listener = bind(config.common.metrics_port).await?;
        let port = api_listener.local_addr()?.port();
        let metrics_port = metrics_listener.local_addr()?.port();

        tracing::info!(
            port = port,
            metrics_port = metrics_port,
            store = state.store.backend(),
            "Listening"
        );

        Ok(Self {
            port,
            metrics_port,
            api_listener,
            metrics_listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn metrics_port(&self) -> u16 {
        self.metrics_port
    }

    /// Serve the API and metrics listeners until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let api = axum::serve(self.api_listener, build_router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .into_future();
        let metrics = axum::serve(self.metrics_listener, build_metrics_router()).into_future();

        tokio::select! {
            result = api => {
                if let Err(e) = &result {
                    tracing::error!("API server error: {}", e);
                }
                result
            }
            result = metrics => {
                if let Err(e) = &result {
                    tracing::error!("Metrics server error: {}", e);
                }
                result
            }
        }
    }
}

/// Build the configured record store. A shared MongoDB client is verified
/// here so a bad cluster address stops startup.
pub async fn build_store(config: &RecordConfig) -> Result<Arc<dyn RecordStore>, AppError> {
    match config.store {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory record store; records are lost on restart");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
        StoreBackend::Mongo => {
            let settings = config.mongodb.clone().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!(
                    "MongoDB settings are required for the mongo record store"
                ))
            })?;
            let provider = ConnectionProvider::new(settings).await.map_err(|e| {
                tracing::error!(error = %e, "Failed to initialise MongoDB connection provider");
                AppError::from(e)
            })?;
            Ok(Arc::new(MongoRecordStore::new(provider)))
        }
    }
}

async fn bind(port: u16) -> Result<TcpListener, AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
        AppError::from(e)
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
