//! Gateway HTTP server.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// HTTP server bound to its listening socket.
pub struct GatewayServer {
    listener: TcpListener,
    router: Router,
    cancel: CancellationToken,
    shutdown_timeout: Duration,
}

impl GatewayServer {
    /// Bind `0.0.0.0:port`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayServerError::BindFailed` if the port cannot be bound.
    pub async fn bind(
        port: u16,
        router: Router,
        cancel: CancellationToken,
        shutdown_timeout: Duration,
    ) -> Result<Self, GatewayServerError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayServerError::BindFailed(port, e.to_string()))?;

        Ok(Self {
            listener,
            router,
            cancel,
            shutdown_timeout,
        })
    }

    /// Address the server is listening on.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr, GatewayServerError> {
        self.listener
            .local_addr()
            .map_err(|e| GatewayServerError::ServerFailed(e.to_string()))
    }

    /// Serve until the cancellation token fires.
    ///
    /// After cancellation the server stops accepting connections and waits
    /// up to the shutdown timeout for in-flight requests to finish.
    ///
    /// # Errors
    ///
    /// Returns `GatewayServerError::ServerFailed` if serving fails.
    pub async fn run(self) -> Result<(), GatewayServerError> {
        let addr = self.local_addr()?;
        tracing::info!(addr = %addr, "Gateway listening");

        let shutdown = self.cancel.clone();
        let timeout = self.shutdown_timeout;
        let serve = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .into_future();
        let deadline = async move {
            shutdown.cancelled().await;
            tokio::time::sleep(timeout).await;
        };

        tokio::select! {
            result = serve => {
                result.map_err(|e| GatewayServerError::ServerFailed(e.to_string()))?;
            }
            () = deadline => {
                tracing::warn!(
                    timeout_secs = timeout.as_secs(),
                    "Shutdown timeout elapsed, dropping in-flight requests"
                );
            }
        }

        tracing::info!("Gateway stopped");
        Ok(())
    }
}

/// Gateway server errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

#[cfg(test)]
mod tests {
    use axum::routing::get;

    use super::*;

    #[tokio::test]
    async fn stops_when_cancelled() {
        let cancel = CancellationToken::new();
        let router = Router::new().route("/", get(|| async { "ok" }));
        let server = GatewayServer::bind(0, router, cancel.clone(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);

        let handle = tokio::spawn(server.run());
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(3), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let taken = TcpListener::bind("0.0.0.0:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let result = GatewayServer::bind(
            port,
            Router::new(),
            CancellationToken::new(),
            Duration::from_secs(1),
        )
        .await;
        assert!(matches!(result, Err(GatewayServerError::BindFailed(p, _)) if p == port));
    }
}
