//! HTTP server

use crate::api;
use crate::core::{Config, Result, ServerError, ServerState};

pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    /// Serve until Ctrl-C
    ///
    /// Shutdown cancels the state's token first, so tickets still waiting
    /// for their printer are abandoned while transmissions in flight finish.
    pub async fn run(&self) -> Result<()> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                port: self.config.http_port,
                source,
            })?;

        tracing::info!("Masa print bridge listening on {}", addr);

        let app = api::build_app(self.state.clone());
        let shutdown = self.state.shutdown.clone();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
                shutdown.cancel();
            })
            .await?;

        Ok(())
    }
}
