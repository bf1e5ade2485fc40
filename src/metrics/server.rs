//! HTTP server for the Prometheus metrics endpoint.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::MetricsStore;

/// Errors that can occur during metrics server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Configuration for the metrics server.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self::with_port(crate::config::DEFAULT_PORT)
    }
}

impl MetricsServerConfig {
    /// Creates a config listening on all interfaces at `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], port).into(),
        }
    }
}

/// HTTP server exposing `GET /metrics`.
pub struct MetricsServer {
    listener: TcpListener,
    store: Arc<MetricsStore>,
}

impl MetricsServer {
    /// Binds the listening socket.
    ///
    /// Binding happens up front so that a port conflict is reported before
    /// any collection starts.
    pub async fn bind(
        config: &MetricsServerConfig,
        store: Arc<MetricsStore>,
    ) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: config.bind_addr,
                source,
            })?;

        Ok(Self { listener, store })
    }

    /// Address actually bound, useful when binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves scrapes until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        tracing::info!(%addr, "Metrics server listening");

        axum::serve(self.listener, router(self.store))
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

/// Builds the router serving the metrics snapshot.
pub fn router(store: Arc<MetricsStore>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// Handler for the /metrics endpoint.
async fn metrics_handler(State(store): State<Arc<MetricsStore>>) -> impl IntoResponse {
    match store.encode() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain; charset=utf-8")],
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn test_config_default() {
        let config = MetricsServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn test_config_with_port() {
        let config = MetricsServerConfig::with_port(9171);
        assert_eq!(config.bind_addr.port(), 9171);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let store = Arc::new(MetricsStore::new().unwrap());
        store.set_repository_count("rycus86", 3);

        let response = router(Arc::clone(&store))
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "text/plain; version=0.0.4; charset=utf-8"
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8_lossy(&bytes);
        assert!(body.contains("github_repo_count{owner=\"rycus86\"} 3"));
    }

    #[tokio::test]
    async fn test_other_routes_not_found() {
        let store = Arc::new(MetricsStore::new().unwrap());

        for uri in ["/", "/health", "/metrics/extra"] {
            let response = router(Arc::clone(&store))
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_bind_conflict() {
        let store = Arc::new(MetricsStore::new().unwrap());
        let loopback = MetricsServerConfig {
            bind_addr: ([127, 0, 0, 1], 0).into(),
        };
        let first = MetricsServer::bind(&loopback, Arc::clone(&store)).await.unwrap();
        let taken = first.local_addr().unwrap();

        let second = MetricsServer::bind(&MetricsServerConfig { bind_addr: taken }, store).await;
        assert!(matches!(second, Err(ServerError::Bind { .. })));
    }
}
