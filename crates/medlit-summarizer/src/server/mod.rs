//! HTTP server for the summarize-search API.

pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::pipeline::Pipeline;

/// HTTP front end over a [`Pipeline`].
#[derive(Debug, Clone)]
pub struct Server {
    pipeline: Arc<Pipeline>,
}

impl Server {
    /// Create a server.
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline: Arc::new(pipeline) }
    }

    /// The application router, without a listener.
    #[must_use]
    pub fn router(&self) -> axum::Router {
        routes::create_router(Arc::clone(&self.pipeline))
    }

    /// Serve on `0.0.0.0:port` until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns error if the port cannot be bound or the server fails.
    pub async fn run_http(self, port: u16) -> anyhow::Result<()> {
        let router = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server listening on http://{}", addr);

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(err) => tracing::error!(error = %err, "Failed to listen for Ctrl-C, shutting down"),
    }
}
