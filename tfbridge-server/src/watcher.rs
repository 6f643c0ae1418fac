use notify::{EventKind, RecursiveMode, Watcher};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, FileIdMap};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tfbridge_core::{ChangeStatus, Config, TfvcClient};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Directories the external tool (and the bridge itself) writes metadata to;
/// modifications under them never trigger a checkout.
const IGNORE_PATTERNS: &[&str] = &["$tf", ".tfbridge"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoCheckoutOptions {
    pub enabled: bool,
    pub on_save_only: bool,
}

impl AutoCheckoutOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enabled: config.auto_checkout,
            on_save_only: config.auto_checkout_on_save_only,
        }
    }
}

/// Reacts to document-changed and document-saved signals by checking out
/// modified files that are not yet checked out.
///
/// Filesystem modify events under the workspace root are treated as
/// document-changed signals; explicit editor signals arrive through the API.
/// A per-path in-flight guard drops signals for a path that is already being
/// processed; there is no queueing or coalescing beyond that.
pub struct AutoCheckoutWatcher {
    core: Arc<WatcherCore>,
    debouncer: Mutex<Option<Debouncer<notify::RecommendedWatcher, FileIdMap>>>,
}

struct WatcherCore {
    client: Arc<TfvcClient>,
    root: PathBuf,
    options: RwLock<AutoCheckoutOptions>,
    in_flight: Mutex<HashSet<String>>,
}

impl AutoCheckoutWatcher {
    pub fn new(
        root: PathBuf,
        client: Arc<TfvcClient>,
        options: AutoCheckoutOptions,
    ) -> anyhow::Result<Self> {
        let watcher = Self {
            core: Arc::new(WatcherCore {
                client,
                root,
                options: RwLock::new(options),
                in_flight: Mutex::new(HashSet::new()),
            }),
            debouncer: Mutex::new(None),
        };
        watcher.reconfigure(options)?;
        Ok(watcher)
    }

    pub fn options(&self) -> AutoCheckoutOptions {
        self.core.options()
    }

    /// Atomically replaces the auto-checkout configuration and the filesystem
    /// subscription. The old subscription is torn down before a new one is
    /// installed, so duplicates never accumulate.
    pub fn reconfigure(&self, options: AutoCheckoutOptions) -> anyhow::Result<()> {
        *self.core.options.write().unwrap() = options;
        // Dropping the debouncer closes its channel; the old relay task ends.
        self.debouncer.lock().unwrap().take();
        if options.enabled && !options.on_save_only {
            self.start_fs_watch()?;
        }
        info!(
            enabled = options.enabled,
            on_save_only = options.on_save_only,
            "auto-checkout reconfigured"
        );
        Ok(())
    }

    pub fn has_fs_watch(&self) -> bool {
        self.debouncer.lock().unwrap().is_some()
    }

    pub async fn handle_document_changed(&self, path: &str) {
        self.core.handle_document_changed(path).await;
    }

    pub async fn handle_document_saved(&self, path: &str) {
        self.core.handle_document_saved(path).await;
    }

    fn start_fs_watch(&self) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel(100);

        let mut debouncer = new_debouncer(
            Duration::from_millis(500),
            None,
            move |result: DebounceEventResult| {
                if let Err(e) = tx.blocking_send(result) {
                    error!("Failed to send event: {}", e);
                }
            },
        )?;
        debouncer
            .watcher()
            .watch(&self.core.root, RecursiveMode::Recursive)?;
        *self.debouncer.lock().unwrap() = Some(debouncer);
        info!("auto-checkout watcher started for {:?}", self.core.root);

        let core = Arc::clone(&self.core);
        tokio::spawn(async move {
            while let Some(result) = rx.recv().await {
                match result {
                    Ok(events) => {
                        for event in events {
                            let event = event.event;
                            if !matches!(event.kind, EventKind::Modify(_)) {
                                continue;
                            }
                            for path in &event.paths {
                                if core.should_ignore(path) {
                                    continue;
                                }
                                let relative = core.relative(path);
                                core.handle_document_changed(&relative).await;
                            }
                        }
                    }
                    Err(errors) => {
                        for error in errors {
                            error!("Watch error: {:?}", error);
                        }
                    }
                }
            }
        });

        Ok(())
    }
}

impl WatcherCore {
    fn options(&self) -> AutoCheckoutOptions {
        *self.options.read().unwrap()
    }

    async fn handle_document_changed(&self, path: &str) {
        if !self.should_trigger(false) {
            return;
        }
        self.trigger(path).await;
    }

    async fn handle_document_saved(&self, path: &str) {
        if !self.should_trigger(true) {
            return;
        }
        self.trigger(path).await;
    }

    fn should_trigger(&self, saved: bool) -> bool {
        let options = self.options();
        options.enabled && (saved || !options.on_save_only)
    }

    async fn trigger(&self, path: &str) {
        if !self.try_begin(path) {
            debug!(path, "checkout already in flight, dropping signal");
            return;
        }
        if let Err(e) = self.process(path).await {
            // Failures here must never reach the editor's save pipeline.
            warn!(path, error = %e, "auto-checkout failed");
        }
        self.finish(path);
    }

    async fn process(&self, path: &str) -> tfbridge_core::Result<()> {
        let status = self.client.file_status(path).await?;
        if status == ChangeStatus::Edit {
            debug!(path, "file is already checked out");
            return Ok(());
        }
        self.client.checkout(path).await?;
        self.client.refresh_pending_changes().await?;
        info!(path, "checked out automatically");
        Ok(())
    }

    fn try_begin(&self, path: &str) -> bool {
        self.in_flight.lock().unwrap().insert(path.to_string())
    }

    fn finish(&self, path: &str) {
        self.in_flight.lock().unwrap().remove(path);
    }

    fn should_ignore(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let path_str = relative.to_string_lossy();
        IGNORE_PATTERNS.iter().any(|p| path_str.contains(p))
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tfbridge_core::{CommandExecutor, CommandHistoryLog, FilesetManager};

    fn test_client() -> Arc<TfvcClient> {
        let config = Config {
            tool_path: "tfbridge-no-such-tool".to_string(),
            ..Config::default()
        };
        Arc::new(TfvcClient::new(
            Arc::new(CommandExecutor::new(&config, std::env::temp_dir())),
            Arc::new(FilesetManager::new()),
            Arc::new(CommandHistoryLog::new()),
        ))
    }

    fn options(enabled: bool, on_save_only: bool) -> AutoCheckoutOptions {
        AutoCheckoutOptions {
            enabled,
            on_save_only,
        }
    }

    fn watcher_with(
        temp_dir: &TempDir,
        opts: AutoCheckoutOptions,
    ) -> AutoCheckoutWatcher {
        AutoCheckoutWatcher::new(temp_dir.path().to_path_buf(), test_client(), opts).unwrap()
    }

    #[tokio::test]
    async fn test_watcher_creation() {
        let temp_dir = TempDir::new().unwrap();
        let watcher = watcher_with(&temp_dir, options(true, false));

        assert!(watcher.has_fs_watch());
    }

    #[tokio::test]
    async fn test_save_only_mode_skips_fs_watch() {
        let temp_dir = TempDir::new().unwrap();
        let watcher = watcher_with(&temp_dir, options(true, true));

        assert!(!watcher.has_fs_watch());
    }

    #[tokio::test]
    async fn test_reconfigure_never_accumulates_subscriptions() {
        let temp_dir = TempDir::new().unwrap();
        let watcher = watcher_with(&temp_dir, options(true, false));

        watcher.reconfigure(options(true, false)).unwrap();
        assert!(watcher.has_fs_watch());

        watcher.reconfigure(options(false, false)).unwrap();
        assert!(!watcher.has_fs_watch());
        assert_eq!(watcher.options(), options(false, false));
    }

    #[tokio::test]
    async fn test_in_flight_guard_is_per_path() {
        let temp_dir = TempDir::new().unwrap();
        let watcher = watcher_with(&temp_dir, options(true, false));

        assert!(watcher.core.try_begin("src/a.rs"));
        // A second trigger for the same path while in flight is dropped.
        assert!(!watcher.core.try_begin("src/a.rs"));
        // Other paths are unaffected.
        assert!(watcher.core.try_begin("src/b.rs"));

        watcher.core.finish("src/a.rs");
        assert!(watcher.core.try_begin("src/a.rs"));
    }

    #[tokio::test]
    async fn test_trigger_gating() {
        let temp_dir = TempDir::new().unwrap();
        let watcher = watcher_with(&temp_dir, options(true, true));

        // Save-only mode: changed signals are ignored, saved signals trigger.
        assert!(!watcher.core.should_trigger(false));
        assert!(watcher.core.should_trigger(true));

        watcher.reconfigure(options(false, false)).unwrap();
        assert!(!watcher.core.should_trigger(false));
        assert!(!watcher.core.should_trigger(true));

        watcher.reconfigure(options(true, false)).unwrap();
        assert!(watcher.core.should_trigger(false));
        assert!(watcher.core.should_trigger(true));
    }

    #[tokio::test]
    async fn test_failed_auto_checkout_is_swallowed() {
        let temp_dir = TempDir::new().unwrap();
        let watcher = watcher_with(&temp_dir, options(true, false));

        // The stand-in tool does not exist; the failure is logged, not
        // propagated, and the path returns to idle.
        watcher.handle_document_changed("src/a.rs").await;
        assert!(watcher.core.try_begin("src/a.rs"));
    }

    #[tokio::test]
    async fn test_should_ignore_metadata_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        let watcher = watcher_with(&temp_dir, options(true, false));

        assert!(watcher.core.should_ignore(&root.join("$tf/properties.tf1")));
        assert!(watcher.core.should_ignore(&root.join(".tfbridge/config.toml")));
        assert!(!watcher.core.should_ignore(&root.join("src/main.rs")));
    }
}
