//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with one route per webhook endpoint
//! - Wire up middleware (request ID, tracing)
//! - Serve plain HTTP or HTTPS on a bound listener
//! - Drain in-flight requests on shutdown

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::any, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::WebhookConfig;
use crate::net::tls::{TlsError, TlsFiles};
use crate::security::InvalidSource;
use crate::webhook::{build_policies, handle_webhook, EndpointPolicy};

/// How long HTTPS connections may take to finish after shutdown starts.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for server startup.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid port {0:?}")]
    InvalidPort(String),

    #[error("invalid endpoint policy: {0}")]
    Policy(#[from] InvalidSource),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] TlsError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP(S) server for the webhook receiver.
pub struct WebhookServer {
    router: Router,
    address: SocketAddr,
    tls: Option<TlsFiles>,
    endpoint_count: usize,
}

impl WebhookServer {
    /// Build the server for a validated configuration.
    pub fn new(config: &WebhookConfig) -> Result<Self, ServerError> {
        let port: u16 = config
            .port
            .parse()
            .map_err(|_| ServerError::InvalidPort(config.port.clone()))?;

        let policies = build_policies(config)?;
        let endpoint_count = policies.len();

        let tls = TlsFiles::from_config(config);

        Ok(Self {
            router: build_router(policies),
            address: SocketAddr::from(([0, 0, 0, 0], port)),
            tls,
            endpoint_count,
        })
    }

    /// Address the server should bind: all interfaces on the configured port.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn is_https(&self) -> bool {
        self.tls.is_some()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoint_count
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` completes.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        match self.tls {
            Some(files) => {
                let tls = files.load().await?;
                tracing::info!(address = %addr, "Listening with HTTPS");

                let handle = axum_server::Handle::new();
                let shutdown_handle = handle.clone();
                tokio::spawn(async move {
                    shutdown.await;
                    shutdown_handle.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
                });

                axum_server::from_tcp_rustls(listener.into_std()?, tls)
                    .handle(handle)
                    .serve(app)
                    .await?;
            }
            None => {
                tracing::info!(address = %addr, "Listening with HTTP");
                axum::serve(listener, app)
                    .with_graceful_shutdown(shutdown)
                    .await?;
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router: one route per endpoint, each bound to its policy.
///
/// A path ending in `/` also serves everything below it.
pub fn build_router(policies: Vec<EndpointPolicy>) -> Router {
    let mut router = Router::new();

    for policy in policies {
        tracing::info!(
            name = %policy.name,
            path = %policy.path,
            allowed_sources = policy.allow_list.len(),
            "Registering webhook endpoint"
        );

        let path = policy.path.clone();
        let mut endpoint = Router::new().route(&path, any(handle_webhook));
        if path.ends_with('/') {
            endpoint = endpoint.route(&format!("{path}{{*rest}}"), any(handle_webhook));
        }
        router = router.merge(endpoint.with_state(Arc::new(policy)));
    }

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id()),
    )
}
