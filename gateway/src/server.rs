//! HTTP server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};
use xrate_fx::RateResolver;

use crate::routes::router;
use crate::state::{AppState, GatewayState};

/// Gateway server ready to bind.
pub struct GatewayServer {
    bind_address: SocketAddr,
    state: AppState,
}

impl GatewayServer {
    /// Create a server that will serve `resolver` on `bind_address`.
    pub fn new(bind_address: SocketAddr, resolver: Arc<RateResolver>) -> Self {
        Self {
            bind_address,
            state: AppState::new(resolver),
        }
    }

    /// Bind the listener and start serving on a background task.
    #[instrument(skip(self), fields(bind_address = %self.bind_address))]
    pub async fn start(self) -> Result<RunningGateway> {
        let cancellation_token = CancellationToken::new();
        let listener = TcpListener::bind(self.bind_address).await?;
        let bound_address = listener.local_addr()?;
        let app = router(self.state.clone());

        self.state.set_lifecycle(GatewayState::Running);
        info!(%bound_address, "Gateway listening");

        let server_handle = tokio::spawn({
            let shutdown = cancellation_token.child_token();
            let state = self.state.clone();
            async move {
                let draining = state.clone();
                let result = axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                        draining.set_lifecycle(GatewayState::ShuttingDown);
                    })
                    .await;
                state.set_lifecycle(GatewayState::Stopped);
                result
            }
        });

        Ok(RunningGateway {
            bound_address,
            cancellation_token,
            server_handle,
            state: self.state,
        })
    }
}

/// Handle to a running gateway.
pub struct RunningGateway {
    bound_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<std::io::Result<()>>,
    state: AppState,
}

impl RunningGateway {
    /// Address the listener is bound to.
    pub fn bound_address(&self) -> SocketAddr {
        self.bound_address
    }

    /// Token that begins graceful shutdown when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> GatewayState {
        self.state.lifecycle()
    }

    /// Request shutdown and wait for in-flight requests to drain.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.wait().await
    }

    /// Wait until the server task finishes.
    pub async fn wait(self) -> Result<()> {
        self.server_handle
            .await
            .map_err(|error| anyhow!("Gateway server task failed: {error}"))??;
        info!(bound_address = %self.bound_address, "Gateway stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use xrate_fx::{MockFetcher, ResolverConfig};

    fn resolver() -> Arc<RateResolver> {
        let config = ResolverConfig {
            sources: Vec::new(),
            ..ResolverConfig::default()
        };
        Arc::new(RateResolver::new(Arc::new(MockFetcher::new()), config))
    }

    #[tokio::test]
    async fn test_start_serve_and_stop() {
        let server = GatewayServer::new("127.0.0.1:0".parse().unwrap(), resolver());
        let running = server.start().await.unwrap();
        assert_eq!(running.lifecycle(), GatewayState::Running);

        let url = format!("http://{}/rates", running.bound_address());
        let body: Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["isFallback"], true);

        let state = running.state.clone();
        running.stop().await.unwrap();
        assert_eq!(state.lifecycle(), GatewayState::Stopped);
    }

    #[tokio::test]
    async fn test_shutdown_token_stops_server() {
        let running = GatewayServer::new("127.0.0.1:0".parse().unwrap(), resolver())
            .start()
            .await
            .unwrap();
        let address = running.bound_address();

        running.shutdown_token().cancel();
        running.wait().await.unwrap();

        assert!(reqwest::get(format!("http://{address}/health")).await.is_err());
    }
}
