//! On-demand diagnostics report.
//!
//! Every section is independently fault-tolerant: a failing sub-query
//! degrades to a placeholder for that section only and never aborts the
//! whole report.

use crate::config::Config;
use crate::executor::{COLLECTION_URL_VAR, CREDENTIAL_MARKER_VARS};
use crate::fileset::FilesetManager;
use crate::history::CommandHistoryLog;
use crate::tfvc::TfvcClient;
use std::fmt::Write;
use std::sync::Arc;

const NOT_DETECTED: &str = "Not detected";
const RECENT_COMMANDS: usize = 10;

pub struct DiagnosticsReporter {
    config: Config,
    client: Arc<TfvcClient>,
    fileset: Arc<FilesetManager>,
    history: Arc<CommandHistoryLog>,
}

impl DiagnosticsReporter {
    pub fn new(
        config: Config,
        client: Arc<TfvcClient>,
        fileset: Arc<FilesetManager>,
        history: Arc<CommandHistoryLog>,
    ) -> Self {
        Self {
            config,
            client,
            fileset,
            history,
        }
    }

    pub async fn generate(&self) -> String {
        let mut report = String::new();

        section(&mut report, "Environment");
        line(&mut report, "OS", std::env::consts::OS);
        line(&mut report, "Architecture", std::env::consts::ARCH);
        line(&mut report, "Bridge version", env!("CARGO_PKG_VERSION"));

        section(&mut report, "Configuration");
        line(&mut report, "Tool path", &self.config.tool_path);
        line(
            &mut report,
            "Auto checkout",
            &self.config.auto_checkout.to_string(),
        );
        line(
            &mut report,
            "Auto checkout on save only",
            &self.config.auto_checkout_on_save_only.to_string(),
        );
        line(
            &mut report,
            "Integrated credentials",
            &self.config.use_integrated_credentials.to_string(),
        );
        line(
            &mut report,
            "Show file status",
            &self.config.show_file_status.to_string(),
        );
        line(&mut report, "Log level", &self.config.log_level);

        // Presence only, never the values.
        section(&mut report, "Credential environment");
        line(&mut report, COLLECTION_URL_VAR, presence(COLLECTION_URL_VAR));
        for var in CREDENTIAL_MARKER_VARS {
            line(&mut report, var, presence(var));
        }

        section(&mut report, "Workspace");
        match self.client.workspace_info().await {
            Ok(info) => {
                line(
                    &mut report,
                    "Collection",
                    info.collection_url.as_deref().unwrap_or(NOT_DETECTED),
                );
                line(
                    &mut report,
                    "Workspace",
                    info.workspace_name.as_deref().unwrap_or(NOT_DETECTED),
                );
                line(
                    &mut report,
                    "Owner",
                    info.owner.as_deref().unwrap_or(NOT_DETECTED),
                );
            }
            Err(_) => {
                line(&mut report, "Collection", NOT_DETECTED);
                line(&mut report, "Workspace", NOT_DETECTED);
                line(&mut report, "Owner", NOT_DETECTED);
            }
        }

        section(&mut report, "External tool");
        line(
            &mut report,
            "Version",
            self.client
                .tool_version()
                .await
                .as_deref()
                .unwrap_or(NOT_DETECTED),
        );

        section(&mut report, "Pending changes");
        let all = self.fileset.all_files();
        let included = self.fileset.included_files().len();
        line(&mut report, "Total", &all.len().to_string());
        line(&mut report, "Included", &included.to_string());
        line(&mut report, "Excluded", &(all.len() - included).to_string());
        for (status, count) in self.fileset.status_counts() {
            line(&mut report, status.as_str(), &count.to_string());
        }

        section(&mut report, "Recent commands");
        let recent = self.history.recent(RECENT_COMMANDS);
        if recent.is_empty() {
            report.push_str("  (none)\n");
        } else {
            for entry in recent {
                let outcome = if entry.success { "ok" } else { "failed" };
                let _ = writeln!(
                    report,
                    "  {} [{}] {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    outcome,
                    entry.command
                );
            }
        }

        section(&mut report, "Credential validation");
        let status = if self.client.validate_credentials().await {
            "ok"
        } else {
            "failed"
        };
        line(&mut report, "Server reachable", status);

        report
    }
}

fn section(report: &mut String, title: &str) {
    if !report.is_empty() {
        report.push('\n');
    }
    let _ = writeln!(report, "=== {} ===", title);
}

fn line(report: &mut String, label: &str, value: &str) {
    let _ = writeln!(report, "  {}: {}", label, value);
}

fn presence(var: &str) -> &'static str {
    if std::env::var_os(var).is_some() {
        "set"
    } else {
        "not set"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::CommandExecutor;

    fn reporter_with_tool(tool_path: &str) -> DiagnosticsReporter {
        let config = Config {
            tool_path: tool_path.to_string(),
            ..Config::default()
        };
        let executor = Arc::new(CommandExecutor::new(&config, std::env::temp_dir()));
        let fileset = Arc::new(FilesetManager::new());
        let history = Arc::new(CommandHistoryLog::new());
        let client = Arc::new(TfvcClient::new(
            executor,
            Arc::clone(&fileset),
            Arc::clone(&history),
        ));
        DiagnosticsReporter::new(config, client, fileset, history)
    }

    #[tokio::test]
    async fn test_report_degrades_when_tool_is_missing() {
        let reporter = reporter_with_tool("tfbridge-no-such-tool");
        let report = reporter.generate().await;

        // Every section renders even though every live probe failed.
        assert!(report.contains("=== Environment ==="));
        assert!(report.contains("=== Workspace ==="));
        assert!(report.contains("Collection: Not detected"));
        assert!(report.contains("Version: Not detected"));
        assert!(report.contains("Server reachable: failed"));
        assert!(report.contains("(none)"));
    }

    #[tokio::test]
    async fn test_report_counts_pending_changes() {
        use crate::models::{ChangeStatus, PendingChange};

        let reporter = reporter_with_tool("tfbridge-no-such-tool");
        reporter.fileset.set_pending_changes(vec![
            PendingChange::new("a.txt", ChangeStatus::Edit),
            PendingChange::new("b.txt", ChangeStatus::Add),
        ]);
        reporter.fileset.set_file_inclusion("b.txt", false);

        let report = reporter.generate().await;
        assert!(report.contains("Total: 2"));
        assert!(report.contains("Included: 1"));
        assert!(report.contains("Excluded: 1"));
        assert!(report.contains("edit: 1"));
        assert!(report.contains("add: 1"));
    }

    #[tokio::test]
    async fn test_report_never_prints_credential_values() {
        let reporter = reporter_with_tool("tfbridge-no-such-tool");
        let report = reporter.generate().await;

        for var in CREDENTIAL_MARKER_VARS {
            assert!(report.contains(var));
        }
        assert!(report.contains("=== Credential environment ==="));
    }

    #[tokio::test]
    async fn test_report_lists_recent_commands() {
        let reporter = reporter_with_tool("tfbridge-no-such-tool");
        reporter.history.record("tf branches", true);
        reporter.history.record("tf checkin -comment:x a.txt", false);

        let report = reporter.generate().await;
        assert!(report.contains("[ok] tf branches"));
        assert!(report.contains("[failed] tf checkin -comment:x a.txt"));
    }
}
