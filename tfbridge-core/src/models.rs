use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Add,
    Edit,
    Delete,
    Rename,
    None,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ChangeStatus::Add => "add",
            ChangeStatus::Edit => "edit",
            ChangeStatus::Delete => "delete",
            ChangeStatus::Rename => "rename",
            ChangeStatus::None => "none",
        }
    }

    /// Parses a status verb from the external tool's output. Only the four
    /// real change verbs are accepted; anything else is not a status line.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "add" => Some(ChangeStatus::Add),
            "edit" => Some(ChangeStatus::Edit),
            "delete" => Some(ChangeStatus::Delete),
            "rename" => Some(ChangeStatus::Rename),
            _ => None,
        }
    }
}

/// A locally detected, not-yet-submitted modification to a tracked file.
///
/// The set of pending changes is replaced wholesale on every refresh; the
/// inclusion flag is locally owned state and resets to `true` whenever the
/// owning entry is replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingChange {
    pub path: String,
    pub status: ChangeStatus,
    pub is_included: bool,
}

impl PendingChange {
    pub fn new(path: impl Into<String>, status: ChangeStatus) -> Self {
        Self {
            path: path.into(),
            status,
            is_included: true,
        }
    }
}

/// Captured output of a single external tool invocation. Ephemeral, one per
/// invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    /// Result stood up when a suppressed invocation could not even spawn.
    /// Probe callers rely on this instead of an error.
    pub fn not_spawned() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: -1,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// One changeset from a file history query. Parsed on demand, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub changeset_id: i64,
    pub author: String,
    pub date: String,
    pub comment: Option<String>,
}

/// Workspace metadata extracted from a workfold query. Each field is present
/// only if its pattern matched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub collection_url: Option<String>,
    pub workspace_name: Option<String>,
    pub owner: Option<String>,
}

/// One tracked invocation in the bounded command history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandHistoryEntry {
    pub command: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
}

impl CommandHistoryEntry {
    pub fn new(command: impl Into<String>, success: bool) -> Self {
        Self {
            command: command.into(),
            timestamp: Utc::now(),
            success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_status_roundtrip() {
        for status in [
            ChangeStatus::Add,
            ChangeStatus::Edit,
            ChangeStatus::Delete,
            ChangeStatus::Rename,
        ] {
            assert_eq!(ChangeStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_change_status_parse_case_insensitive() {
        assert_eq!(ChangeStatus::parse("EDIT"), Some(ChangeStatus::Edit));
        assert_eq!(ChangeStatus::parse("Add"), Some(ChangeStatus::Add));
        assert_eq!(ChangeStatus::parse("none"), None);
        assert_eq!(ChangeStatus::parse("branch"), None);
    }

    #[test]
    fn test_pending_change_starts_included() {
        let change = PendingChange::new("src/main.rs", ChangeStatus::Edit);
        assert_eq!(change.path, "src/main.rs");
        assert!(change.is_included);
    }

    #[test]
    fn test_not_spawned_result() {
        let result = CommandResult::not_spawned();
        assert_eq!(result.exit_code, -1);
        assert!(result.stdout.is_empty());
        assert!(result.stderr.is_empty());
        assert!(!result.succeeded());
    }
}
