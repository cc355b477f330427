//! cb2m artifact server.
//!
//! Serves codebottle snippets as Maven artifacts: a rendered POM for
//! descriptor requests, a freshly compiled jar for archive requests.
//!
//! # Architecture
//!
//! The server consists of:
//! - **Artifact**: the `io/codebottle/<user>/<snippet>/<revision>/<file>` grammar
//! - **Store**: snippet and revision lookup with a startup barrier
//! - **Routes**: HTTP handlers that drive the `cb2m_core` pipeline
//! - **Error**: mapping of failures to HTTP statuses and JSON bodies

pub mod artifact;
pub mod error;
pub mod routes;
pub mod store;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cb2m_core::compile::DEFAULT_COMPILE_TIMEOUT;
use cb2m_core::paths::DEFAULT_TEMP_ROOT;
use cb2m_core::template::DEFAULT_SITE_URL;
use cb2m_core::{ArchiveBuilder, CompilerSettings, DescriptorTemplate, JavaToolchain, TempRoot};

pub use artifact::{ArtifactKind, ArtifactRoute};
pub use error::{ServerError, ServerResult};
pub use routes::{AppState, create_router};
pub use store::{MemoryStore, SnapshotEntry, SnippetStore};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory build jobs are created under.
    pub temp_dir: PathBuf,
    /// JSON snippet snapshot to serve.
    pub snapshot: Option<PathBuf>,
    /// Descriptor template file; the built-in POM is used when unset.
    pub template: Option<PathBuf>,
    /// javac binary; looked up in PATH when unset.
    pub javac: Option<PathBuf>,
    /// Upper bound on one javac run.
    pub compile_timeout: Duration,
    /// Base URL for revision links in descriptors.
    pub site_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4226,
            temp_dir: PathBuf::from(DEFAULT_TEMP_ROOT),
            snapshot: None,
            template: None,
            javac: None,
            compile_timeout: DEFAULT_COMPILE_TIMEOUT,
            site_url: DEFAULT_SITE_URL.to_string(),
        }
    }
}

impl AppState {
    /// Build the shared state from `config`.
    ///
    /// Fails if the temp root is not writable, the template file cannot be
    /// read, or javac cannot be found.
    pub fn from_config(config: &ServerConfig, store: Arc<dyn SnippetStore>) -> ServerResult<Self> {
        let root = TempRoot::create(&config.temp_dir)?;

        let toolchain = match &config.javac {
            Some(path) => JavaToolchain::from_path(path),
            None => JavaToolchain::detect()?,
        };
        tracing::info!("Using compiler {}", toolchain.program().display());

        let template = match &config.template {
            Some(path) => DescriptorTemplate::load(path)?,
            None => DescriptorTemplate::builtin(),
        };

        let settings = CompilerSettings {
            timeout: config.compile_timeout,
            ..CompilerSettings::default()
        };

        Ok(Self {
            store,
            template,
            builder: ArchiveBuilder::new(root, toolchain, settings),
            site_url: config.site_url.clone(),
        })
    }
}

/// Start the server with an in-memory store fed from `config.snapshot`.
pub async fn serve(config: ServerConfig) -> ServerResult<()> {
    let store = Arc::new(MemoryStore::new());
    match &config.snapshot {
        Some(path) => {
            store.spawn_snapshot_load(path.clone());
        }
        None => {
            tracing::warn!("No snippet snapshot configured, serving an empty store");
            store.mark_ready();
        }
    }

    serve_with_store(config, store).await
}

/// Start the server with a caller-provided snippet store.
pub async fn serve_with_store(config: ServerConfig, store: Arc<dyn SnippetStore>) -> ServerResult<()> {
    let state = Arc::new(AppState::from_config(&config, store)?);
    let app = create_router(state);

    // Build address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|_| ServerError::Io {
            path: PathBuf::new(),
            message: format!("Invalid address: {}:{}", config.host, config.port),
        })?;

    tracing::info!("Starting cb2m server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    // Handle Ctrl+C for graceful shutdown
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 4226);
        assert_eq!(config.temp_dir, PathBuf::from("/tmp/cb2m"));
        assert_eq!(config.compile_timeout, Duration::from_secs(60));
        assert!(config.snapshot.is_none());
    }

    #[test]
    fn test_state_rejects_missing_template() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = ServerConfig {
            temp_dir: temp.path().join("jobs"),
            template: Some(temp.path().join("missing-pom.xml")),
            javac: Some(PathBuf::from("javac")),
            ..ServerConfig::default()
        };

        let store: Arc<dyn SnippetStore> = Arc::new(MemoryStore::new());
        let err = AppState::from_config(&config, store).err().unwrap();
        assert!(matches!(
            err,
            ServerError::Core(cb2m_core::Error::TemplateSourceMissing { .. })
        ));
    }
}
