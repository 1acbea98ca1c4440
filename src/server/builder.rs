//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::JsonApiConfig;
use crate::core::{Authorizer, ResourceRepository};
use crate::schema::ServerRepository;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Builder for creating HTTP servers exposing JSON:API servers
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_repository(InMemoryResourceStore::new())
///     .with_config(JsonApiConfig::from_yaml_file("jsonapi.yaml")?)
///     .build()?;
/// ```
pub struct ServerBuilder {
    repository: Option<Arc<dyn ResourceRepository>>,
    authorizer: Option<Arc<dyn Authorizer>>,
    servers: Option<ServerRepository>,
    configs: Vec<JsonApiConfig>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            repository: None,
            authorizer: None,
            servers: None,
            configs: Vec::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the resource repository (required)
    pub fn with_repository(self, repository: impl ResourceRepository + 'static) -> Self {
        self.with_shared_repository(Arc::new(repository))
    }

    /// Set a resource repository already shared with the application
    pub fn with_shared_repository(mut self, repository: Arc<dyn ResourceRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Set the authorizer consulted before every operation
    ///
    /// Defaults to allowing everything.
    pub fn with_authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Some(Arc::new(authorizer));
        self
    }

    /// Use already built servers instead of configuration
    pub fn with_servers(mut self, servers: ServerRepository) -> Self {
        self.servers = Some(servers);
        self
    }

    /// Add a configuration
    ///
    /// Configurations are merged in the order they were added.
    pub fn with_config(mut self, config: JsonApiConfig) -> Self {
        self.configs.push(config);
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for routes that are not JSON:API resources, such as
    /// authentication endpoints or webhooks.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    ///
    /// Servers passed to [`with_servers`](Self::with_servers) take precedence
    /// over configuration.
    pub fn build_host(mut self) -> Result<ServerHost> {
        let repository = self.repository.take().ok_or_else(|| {
            anyhow::anyhow!("ResourceRepository is required. Call .with_repository()")
        })?;

        let servers = match self.servers.take() {
            Some(servers) => servers,
            None => JsonApiConfig::merge(std::mem::take(&mut self.configs)).build_servers()?,
        };

        if servers.is_empty() {
            tracing::warn!("no JSON:API servers configured");
        }

        let mut host = ServerHost::new(servers, repository);
        if let Some(authorizer) = self.authorizer.take() {
            host = host.with_authorizer(authorizer);
        }

        Ok(host)
    }

    /// Build the final REST router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        let router = RestExposure::build_router(host, custom_routes)?;
        Ok(router.layer(TraceLayer::new_for_http()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
