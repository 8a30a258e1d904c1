use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;

use prov_engine::{Collaborators, ProvenanceService};

use crate::config::ServiceConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Product-record provenance server.
pub struct ProvServer {
    config: ServiceConfig,
    service: Arc<ProvenanceService>,
}

impl ProvServer {
    /// A server over the given collaborators.
    pub fn new(config: ServiceConfig, collaborators: Collaborators) -> Self {
        let service = ProvenanceService::new(collaborators, config.engine.clone());
        Self {
            config,
            service: Arc::new(service),
        }
    }

    /// A server over fresh in-memory collaborators. State lives as long as
    /// the process.
    pub fn in_memory(config: ServiceConfig) -> Self {
        let (service, _backends) = ProvenanceService::in_memory(config.engine.clone());
        Self {
            config,
            service: Arc::new(service),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn service(&self) -> &Arc<ProvenanceService> {
        &self.service
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.service.clone())
    }

    /// Serve until the process is stopped.
    pub async fn serve(self) -> ServerResult<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(bind_addr = %self.config.bind_addr, "prov server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prov_engine::InMemoryBackends;

    #[test]
    fn server_construction() {
        let server = ProvServer::in_memory(ServiceConfig::default());
        assert_eq!(server.config().bind_addr.port(), 5000);
        assert_eq!(server.service().config(), &ServiceConfig::default().engine);
    }

    #[test]
    fn router_builds() {
        let backends = InMemoryBackends::new();
        let server = ProvServer::new(ServiceConfig::default(), backends.collaborators());
        let _router = server.router();
    }
}
