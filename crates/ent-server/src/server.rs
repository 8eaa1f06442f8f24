use std::sync::Arc;

use ent_registry::{BucketProvider, DiskProvider};
use ent_store::{DiskFileSystem, FileSystem};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::service::Ent;

/// Ent blob server.
pub struct EntServer {
    config: ServerConfig,
    ent: Arc<Ent>,
}

impl EntServer {
    /// Load the bucket registry from `config.provider_dir` and serve a disk
    /// engine rooted at `config.fs_root`.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let provider = DiskProvider::load(&config.provider_dir)?;
        let fs = DiskFileSystem::new(&config.fs_root);
        Ok(Self::with_parts(config, Arc::new(provider), Arc::new(fs)))
    }

    /// Serve the given registry and storage engine.
    pub fn with_parts(
        config: ServerConfig,
        provider: Arc<dyn BucketProvider>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            config,
            ent: Arc::new(Ent::new(provider, fs)),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.ent))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            addr = %self.config.bind_addr,
            fs_root = %self.config.fs_root.display(),
            "ent listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
