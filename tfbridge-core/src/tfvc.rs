//! High-level operations against the external version-control client.
//!
//! `TfvcClient` is the facade collaborators call: it builds argument vectors,
//! runs them through the executor, parses the output, and keeps the fileset
//! and command history in sync. Semantically significant operations are
//! recorded in the command history; probes and refreshes are not.

use crate::error::{Error, Result};
use crate::executor::CommandExecutor;
use crate::fileset::FilesetManager;
use crate::history::CommandHistoryLog;
use crate::models::{ChangeStatus, CommandResult, HistoryItem, PendingChange, WorkspaceInfo};
use crate::parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct TfvcClient {
    executor: Arc<CommandExecutor>,
    fileset: Arc<FilesetManager>,
    history: Arc<CommandHistoryLog>,
}

impl TfvcClient {
    pub fn new(
        executor: Arc<CommandExecutor>,
        fileset: Arc<FilesetManager>,
        history: Arc<CommandHistoryLog>,
    ) -> Self {
        Self {
            executor,
            fileset,
            history,
        }
    }

    pub fn fileset(&self) -> &Arc<FilesetManager> {
        &self.fileset
    }

    pub fn command_history(&self) -> &Arc<CommandHistoryLog> {
        &self.history
    }

    /// Queries the full workspace status and replaces the pending-change set.
    pub async fn refresh_pending_changes(&self) -> Result<Vec<PendingChange>> {
        let result = self
            .executor
            .execute(&["status", "/format:detailed"], false)
            .await?;
        let changes = parser::parse_pending_changes(&result.stdout);
        debug!(count = changes.len(), "refreshed pending changes");
        self.fileset.set_pending_changes(changes.clone());
        Ok(changes)
    }

    /// Status of a single file, `None` when the tool reports no change.
    pub async fn file_status(&self, path: &str) -> Result<ChangeStatus> {
        let result = self.executor.execute(&["status", path], false).await?;
        Ok(parser::parse_file_status(&result.stdout))
    }

    /// Marks a file editable in the workspace metadata.
    pub async fn checkout(&self, path: &str) -> Result<CommandResult> {
        self.executor.execute(&["checkout", path], false).await
    }

    /// Checks in the given paths, or the currently included fileset when no
    /// paths are given.
    pub async fn checkin(&self, paths: &[String], comment: &str) -> Result<CommandResult> {
        let paths = self.resolve_paths(paths)?;
        let args = checkin_args(&paths, comment);
        let result = self.run_recorded(&args).await;
        self.refresh_after_mutation().await;
        result
    }

    /// Creates a server-side shelveset from the given paths, or from the
    /// currently included fileset when no paths are given.
    pub async fn create_shelveset(
        &self,
        name: &str,
        comment: &str,
        paths: &[String],
    ) -> Result<CommandResult> {
        let paths = self.resolve_paths(paths)?;
        let args = shelve_args(name, comment, &paths);
        let result = self.run_recorded(&args).await;
        self.refresh_after_mutation().await;
        result
    }

    /// Applies a shelveset created by `owner`.
    pub async fn apply_shelveset(&self, name: &str, owner: &str) -> Result<CommandResult> {
        let args = vec![
            "unshelve".to_string(),
            name.to_string(),
            owner.to_string(),
            "/recursive".to_string(),
        ];
        let result = self.run_recorded(&args).await;
        self.refresh_after_mutation().await;
        result
    }

    /// Merges `source` into `target` recursively.
    pub async fn merge(&self, source: &str, target: &str) -> Result<CommandResult> {
        let args = vec![
            "merge".to_string(),
            source.to_string(),
            target.to_string(),
            "/recursive".to_string(),
        ];
        let result = self.run_recorded(&args).await;
        self.refresh_after_mutation().await;
        result
    }

    /// Updates the workspace to the latest server version.
    pub async fn get_latest(&self) -> Result<CommandResult> {
        let args = vec!["get".to_string(), "/recursive".to_string()];
        let result = self.run_recorded(&args).await;
        self.refresh_after_mutation().await;
        result
    }

    /// File history, newest first as reported by the tool.
    pub async fn history(&self, path: &str) -> Result<Vec<HistoryItem>> {
        let args = vec![
            "history".to_string(),
            path.to_string(),
            "/format:detailed".to_string(),
        ];
        let result = self.run_recorded(&args).await?;
        Ok(parser::parse_history(&result.stdout))
    }

    /// Branch list for the workspace's project collection.
    pub async fn branches(&self) -> Result<Vec<String>> {
        let args = vec!["branches".to_string()];
        let result = self.run_recorded(&args).await?;
        Ok(parser::parse_branches(&result.stdout))
    }

    /// Downloads the server version of a file to a temporary path, for a
    /// generic file-comparison facility to display.
    pub async fn view_file(&self, path: &str) -> Result<PathBuf> {
        let file_name = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("view.tmp");
        let temp = tempfile::Builder::new()
            .prefix("tfbridge-")
            .suffix(&format!("-{}", file_name))
            .tempfile()?;
        let (_, temp_path) = temp.keep().map_err(|e| Error::Io(e.error))?;

        let args = vec![
            "view".to_string(),
            path.to_string(),
            format!("/output:{}", temp_path.display()),
        ];
        self.run_recorded(&args).await?;
        Ok(temp_path)
    }

    /// Workspace metadata from a workfold query.
    pub async fn workspace_info(&self) -> Result<WorkspaceInfo> {
        let result = self.executor.execute(&["workfold"], false).await?;
        Ok(parser::parse_workspace_info(&result.stdout))
    }

    /// Suppressed workfold probe; remembers a detected collection URL on the
    /// executor so later invocations inherit it. Never surfaces an error.
    pub async fn detect_collection_url(&self) -> Option<String> {
        let result = self.executor.execute(&["workfold"], true).await.ok()?;
        let info = parser::parse_workspace_info(&result.stdout);
        if let Some(url) = &info.collection_url {
            debug!(url = %url, "detected collection url");
            self.executor.set_collection_url(url.clone());
        }
        info.collection_url
    }

    /// Raw workspace listing, one entry per non-empty output line.
    pub async fn list_workspaces(&self) -> Result<Vec<String>> {
        let result = self.executor.execute(&["workspaces"], false).await?;
        Ok(result
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Creates a new server workspace.
    pub async fn create_workspace(&self, name: &str) -> Result<CommandResult> {
        let args = vec!["workspace".to_string(), "-new".to_string(), name.to_string()];
        self.run_recorded(&args).await
    }

    /// Suppressed probe for the tool's version banner: the first non-empty
    /// line of its help output, if the tool is present at all.
    pub async fn tool_version(&self) -> Option<String> {
        let result = self.executor.execute(&["help"], true).await.ok()?;
        result
            .stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
    }

    /// Suppressed probe used by diagnostics: can the tool reach the server
    /// with the current credentials?
    pub async fn validate_credentials(&self) -> bool {
        match self.executor.execute(&["workspaces"], true).await {
            Ok(result) => result.succeeded(),
            Err(_) => false,
        }
    }

    /// Runs an invocation and records it in the command history, success or
    /// failure.
    async fn run_recorded(&self, args: &[String]) -> Result<CommandResult> {
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let command_line = self.executor.command_line(&arg_refs);
        let result = self.executor.execute(&arg_refs, false).await;
        self.history.record(command_line, result.is_ok());
        result
    }

    fn resolve_paths(&self, paths: &[String]) -> Result<Vec<String>> {
        let resolved: Vec<String> = if paths.is_empty() {
            self.fileset
                .included_files()
                .into_iter()
                .map(|c| c.path)
                .collect()
        } else {
            paths.to_vec()
        };
        if resolved.is_empty() {
            return Err(Error::InvalidOperation(
                "no pending changes are included".to_string(),
            ));
        }
        Ok(resolved)
    }

    async fn refresh_after_mutation(&self) {
        if let Err(e) = self.refresh_pending_changes().await {
            warn!(error = %e, "pending-change refresh after command failed");
        }
    }
}

fn checkin_args(paths: &[String], comment: &str) -> Vec<String> {
    let mut args = vec!["checkin".to_string(), format!("-comment:{}", comment)];
    args.extend(paths.iter().cloned());
    args
}

fn shelve_args(name: &str, comment: &str, paths: &[String]) -> Vec<String> {
    let mut args = vec![
        "shelve".to_string(),
        format!("-comment:{}", comment),
        format!("-name:{}", name),
    ];
    args.extend(paths.iter().cloned());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn client_with_tool(tool_path: &str) -> TfvcClient {
        let config = Config {
            tool_path: tool_path.to_string(),
            ..Config::default()
        };
        TfvcClient::new(
            Arc::new(CommandExecutor::new(&config, std::env::temp_dir())),
            Arc::new(FilesetManager::new()),
            Arc::new(CommandHistoryLog::new()),
        )
    }

    #[test]
    fn test_checkin_args() {
        let args = checkin_args(
            &["a.txt".to_string(), "b.txt".to_string()],
            "fix the thing",
        );
        assert_eq!(
            args,
            vec!["checkin", "-comment:fix the thing", "a.txt", "b.txt"]
        );
    }

    #[test]
    fn test_shelve_args() {
        let args = shelve_args("wip", "half done", &["a.txt".to_string()]);
        assert_eq!(args, vec!["shelve", "-comment:half done", "-name:wip", "a.txt"]);
    }

    #[test]
    fn test_resolve_paths_prefers_explicit() {
        let client = client_with_tool("tf");
        client.fileset.set_pending_changes(vec![
            PendingChange::new("included.txt", ChangeStatus::Edit),
        ]);

        let paths = client.resolve_paths(&["explicit.txt".to_string()]).unwrap();
        assert_eq!(paths, vec!["explicit.txt"]);
    }

    #[test]
    fn test_resolve_paths_falls_back_to_included() {
        let client = client_with_tool("tf");
        client.fileset.set_pending_changes(vec![
            PendingChange::new("a.txt", ChangeStatus::Edit),
            PendingChange::new("b.txt", ChangeStatus::Add),
        ]);
        client.fileset.set_file_inclusion("b.txt", false);

        let paths = client.resolve_paths(&[]).unwrap();
        assert_eq!(paths, vec!["a.txt"]);
    }

    #[test]
    fn test_resolve_paths_rejects_empty_fileset() {
        let client = client_with_tool("tf");
        assert!(matches!(
            client.resolve_paths(&[]),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_command_is_recorded() {
        let client = client_with_tool("tfbridge-no-such-tool");
        let err = client.branches().await.unwrap_err();
        assert!(matches!(err, Error::Command { .. }));

        let recent = client.history.recent(10);
        assert_eq!(recent.len(), 1);
        assert!(!recent[0].success);
        assert_eq!(recent[0].command, "tfbridge-no-such-tool branches");
    }

    #[tokio::test]
    async fn test_probes_never_error_and_are_not_recorded() {
        let client = client_with_tool("tfbridge-no-such-tool");

        assert!(client.detect_collection_url().await.is_none());
        assert!(client.tool_version().await.is_none());
        assert!(!client.validate_credentials().await);
        assert!(client.history.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_view_file_downloads_to_temp() {
        let client = client_with_tool("echo");
        let path = client.view_file("$/project/a.txt").await.unwrap();

        assert!(path.exists());
        let recent = client.history.recent(1);
        assert!(recent[0].command.contains("view $/project/a.txt"));
        std::fs::remove_file(path).ok();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_workspaces_collects_lines() {
        // `echo workspaces` yields a single output line.
        let client = client_with_tool("echo");
        let workspaces = client.list_workspaces().await.unwrap();

        assert_eq!(workspaces, vec!["workspaces"]);
        assert!(client.history.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_merge_is_recorded() {
        let client = client_with_tool("echo");
        client.merge("$/p/main", "$/p/release").await.unwrap();

        let recent = client.history.recent(1);
        assert!(recent[0].command.contains("merge $/p/main $/p/release"));
        assert!(recent[0].success);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_create_workspace_is_recorded() {
        let client = client_with_tool("echo");
        client.create_workspace("build-agent").await.unwrap();

        let recent = client.history.recent(1);
        assert!(recent[0].command.contains("workspace -new build-agent"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_refresh_replaces_fileset() {
        let client = client_with_tool("echo");
        client
            .fileset
            .set_pending_changes(vec![PendingChange::new("stale.txt", ChangeStatus::Edit)]);

        // `echo` stands in for the external tool; the echoed argument line is
        // not a status line, so the refresh yields an empty set.
        let changes = client.refresh_pending_changes().await.unwrap();

        assert!(changes.is_empty());
        assert!(client.fileset.all_files().is_empty());
    }
}
