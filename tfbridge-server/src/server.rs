use crate::api::{create_router, AppState};
use crate::watcher::{AutoCheckoutOptions, AutoCheckoutWatcher};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tfbridge_core::{
    CommandExecutor, CommandHistoryLog, Config, DiagnosticsReporter, Error, FilesetManager,
    TfvcClient,
};
use tracing::{info, warn};

/// Composition root: constructs every service explicitly, once, and passes
/// references down. There are no lazily initialized globals.
pub struct TfBridgeServer {
    root: PathBuf,
    config: Config,
    client: Arc<TfvcClient>,
    fileset: Arc<FilesetManager>,
    watcher: Arc<AutoCheckoutWatcher>,
    reporter: Arc<DiagnosticsReporter>,
}

impl TfBridgeServer {
    pub fn new(root_path: PathBuf) -> anyhow::Result<Self> {
        if !root_path.is_dir() {
            return Err(Error::Workspace(root_path.display().to_string()).into());
        }
        let root = std::fs::canonicalize(&root_path)?;

        let config = Config::load(&root)?;
        config.validate()?;

        let executor = Arc::new(CommandExecutor::new(&config, root.clone()));
        let fileset = Arc::new(FilesetManager::new());
        let history = Arc::new(CommandHistoryLog::new());
        let client = Arc::new(TfvcClient::new(
            executor,
            Arc::clone(&fileset),
            Arc::clone(&history),
        ));
        let watcher = Arc::new(AutoCheckoutWatcher::new(
            root.clone(),
            Arc::clone(&client),
            AutoCheckoutOptions::from_config(&config),
        )?);
        let reporter = Arc::new(DiagnosticsReporter::new(
            config.clone(),
            Arc::clone(&client),
            Arc::clone(&fileset),
            Arc::clone(&history),
        ));

        Ok(Self {
            root,
            config,
            client,
            fileset,
            watcher,
            reporter,
        })
    }

    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        // Startup probes are best-effort; a missing or unauthenticated tool
        // degrades the initial state, it does not prevent serving.
        self.client.detect_collection_url().await;
        if let Err(e) = self.client.refresh_pending_changes().await {
            warn!(error = %e, "initial pending-change refresh failed");
        }

        let state = AppState {
            client: Arc::clone(&self.client),
            fileset: Arc::clone(&self.fileset),
            watcher: Arc::clone(&self.watcher),
            reporter: Arc::clone(&self.reporter),
        };
        let app = create_router(state);

        info!("Server listening on {}", addr);
        info!("Workspace root: {:?}", self.root);
        info!(tool = %self.config.tool_path, "driving external tool");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    pub fn workspace_root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl std::fmt::Debug for TfBridgeServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfBridgeServer")
            .field("root", &self.root)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Drop for TfBridgeServer {
    fn drop(&mut self) {
        self.fileset.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_server_creation() {
        let temp_dir = TempDir::new().unwrap();
        let server = TfBridgeServer::new(temp_dir.path().to_path_buf());

        assert!(server.is_ok());
    }

    #[tokio::test]
    async fn test_missing_root_is_a_workspace_error() {
        let result = TfBridgeServer::new(PathBuf::from("/definitely/not/a/real/root"));
        let err = result.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Workspace(_))
        ));
    }

    #[tokio::test]
    async fn test_server_reads_workspace_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            tool_path: "/opt/tee/tf".to_string(),
            ..Config::default()
        };
        config.save(temp_dir.path()).unwrap();

        let server = TfBridgeServer::new(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(server.config().tool_path, "/opt/tee/tf");
    }
}
