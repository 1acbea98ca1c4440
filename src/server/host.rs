//! Server host for transport-agnostic API exposure
//!
//! The host holds everything an exposure needs to serve the configured
//! JSON:API servers: the servers themselves, the resource repository
//! supplied by the application, and the authorizer consulted before each
//! operation.

use crate::core::{AllowAll, Authorizer, JsonApiResult, ResourceRepository};
use crate::schema::{Server, ServerRepository};
use crate::server::handlers::AppState;
use std::sync::Arc;

/// Host context containing all framework state
pub struct ServerHost {
    /// Configured servers, in declaration order
    pub servers: Arc<ServerRepository>,

    /// Data source for every server
    pub repository: Arc<dyn ResourceRepository>,

    /// Authorizer consulted by every handler
    pub authorizer: Arc<dyn Authorizer>,
}

impl ServerHost {
    /// Build a host that allows every operation
    pub fn new(servers: ServerRepository, repository: Arc<dyn ResourceRepository>) -> Self {
        Self {
            servers: Arc::new(servers),
            repository,
            authorizer: Arc::new(AllowAll),
        }
    }

    /// Replace the authorizer
    pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    /// Configured server names
    pub fn server_names(&self) -> Vec<&str> {
        self.servers.names()
    }

    /// Look up a server by name
    pub fn server(&self, name: &str) -> JsonApiResult<Arc<Server>> {
        self.servers.server(name)
    }

    /// Handler state for one server
    pub fn state_for(&self, server: Arc<Server>) -> AppState {
        AppState {
            server,
            repository: self.repository.clone(),
            authorizer: self.authorizer.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;
    use crate::storage::InMemoryResourceStore;

    fn host() -> ServerHost {
        let servers = ServerRepository::new()
            .with(Server::new("v1", "http://localhost", "/api/v1", SchemaRegistry::new()))
            .with(Server::new("beta", "http://localhost", "/beta", SchemaRegistry::new()));
        ServerHost::new(servers, Arc::new(InMemoryResourceStore::new()))
    }

    #[test]
    fn test_server_names_keep_order() {
        assert_eq!(host().server_names(), vec!["v1", "beta"]);
    }

    #[test]
    fn test_state_for_shares_repository() {
        let host = host();
        let server = host.server("beta").unwrap();
        let state = host.state_for(server);

        assert_eq!(state.server.prefix(), "/beta");
        assert!(Arc::ptr_eq(&state.repository, &host.repository));
    }

    #[test]
    fn test_unknown_server() {
        assert!(host().server("v2").is_err());
    }
}
