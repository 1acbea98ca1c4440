//! REST exposure of the JSON:API servers
//!
//! Consumes a `ServerHost` and produces an Axum `Router` with every server
//! nested under its prefix.

use super::super::host::ServerHost;
use crate::core::ConfigError;
use crate::server::router::build_resource_routes;
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// Returns a router with:
    /// - Health check routes
    /// - Resource, related and relationship routes for every server
    /// - Custom routes
    ///
    /// Fails when two servers share a prefix.
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let mut app = Self::health_routes(&host);

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        let mut mounted: HashMap<&str, &str> = HashMap::new();
        for server in host.servers.iter() {
            if let Some(first) = mounted.insert(server.prefix(), server.name()) {
                return Err(ConfigError::DuplicatePrefix {
                    prefix: server.prefix().to_string(),
                    first: first.to_string(),
                    second: server.name().to_string(),
                }
                .into());
            }

            let routes = build_resource_routes(host.state_for(server.clone()));

            // Router::nest rejects an empty path
            app = if server.prefix().is_empty() {
                app.merge(routes)
            } else {
                app.nest(server.prefix(), routes)
            };

            tracing::debug!(
                server = %server.name(),
                prefix = %server.prefix(),
                "mounted JSON:API server"
            );
        }

        Ok(app)
    }

    /// Build health check routes
    fn health_routes(host: &ServerHost) -> Router {
        let servers: Vec<String> = host
            .server_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        Router::new().route("/health", get(move || Self::health_check(servers)))
    }

    /// Health check endpoint handler
    async fn health_check(servers: Vec<String>) -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "jsonapi-rs",
            "servers": servers
        }))
    }
}
