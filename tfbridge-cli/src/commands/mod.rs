pub mod branches;
pub mod checkin;
pub mod checkout;
pub mod diagnostics;
pub mod get;
pub mod history;
pub mod inclusion;
pub mod shelve;
pub mod start;
pub mod status;
pub mod unshelve;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tfbridge_core::{
    CommandExecutor, CommandHistoryLog, Config, FilesetManager, TfvcClient,
};

/// A locally constructed core for one-shot commands that do not need the
/// daemon.
pub struct LocalBridge {
    pub config: Config,
    pub client: Arc<TfvcClient>,
    pub fileset: Arc<FilesetManager>,
    pub history: Arc<CommandHistoryLog>,
}

pub fn workspace_root() -> anyhow::Result<PathBuf> {
    Ok(std::fs::canonicalize(std::env::current_dir()?)?)
}

pub fn open_local(root: &Path) -> anyhow::Result<LocalBridge> {
    let config = Config::load(root)?;
    config.validate()?;

    let executor = Arc::new(CommandExecutor::new(&config, root.to_path_buf()));
    let fileset = Arc::new(FilesetManager::new());
    let history = Arc::new(CommandHistoryLog::new());
    let client = Arc::new(TfvcClient::new(
        executor,
        Arc::clone(&fileset),
        Arc::clone(&history),
    ));

    Ok(LocalBridge {
        config,
        client,
        fileset,
        history,
    })
}
