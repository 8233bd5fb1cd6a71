//! Server setup and lifecycle management.

use crate::api::create_router;
use crate::api::state::AppState;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use tokio::net::TcpListener;

/// The AFEG gateway server.
pub struct Server {
    config: GatewayConfig,
}

impl Server {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    /// Run until a shutdown signal arrives.
    pub async fn run(self) -> GatewayResult<()> {
        let addr = self.config.server.listen_addr;
        let state = AppState::new(self.config);
        let app = create_router(state);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("AFEG gateway listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| GatewayError::Server(e.to_string()))?;

        tracing::info!("AFEG gateway shutting down");
        Ok(())
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!("failed to install signal handler: {}", err),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("received terminate signal, initiating graceful shutdown");
        }
    }
}
