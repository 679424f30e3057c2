use std::future::Future;

use tokio::net::TcpListener;

use crate::config::HealthConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Health-check HTTP server.
pub struct HealthServer {
    config: HealthConfig,
}

impl HealthServer {
    pub fn new(config: HealthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        tracing::info!(%addr, "health endpoint listening");
        axum::serve(listener, build_router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
