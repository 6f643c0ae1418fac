//! Line-oriented parsers for the external tool's text output.
//!
//! The tool's output format is not contractually stable, so every parser here
//! is a table of line matchers tried in sequence: a line that matches produces
//! a record, anything else is skipped. Partial information is preferable to a
//! hard failure.

use crate::models::{ChangeStatus, HistoryItem, PendingChange, WorkspaceInfo};

/// Parses a `status /format:detailed` query into a fresh pending-change list.
///
/// Matches lines of the form `<status-verb> <path>` where the verb is one of
/// add, edit, delete, rename (case-insensitive). Every produced entry starts
/// included.
pub fn parse_pending_changes(output: &str) -> Vec<PendingChange> {
    output.lines().filter_map(parse_pending_change_line).collect()
}

fn parse_pending_change_line(line: &str) -> Option<PendingChange> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace)?;
    let status = ChangeStatus::parse(verb)?;
    let path = rest.trim();
    if path.is_empty() {
        return None;
    }
    Some(PendingChange::new(path, status))
}

/// Extracts the status of a single-file status query: the first keyword among
/// edit, add, delete, rename found anywhere in the output, or `None` if the
/// output contains none of them.
pub fn parse_file_status(output: &str) -> ChangeStatus {
    let lower = output.to_lowercase();
    for status in [
        ChangeStatus::Edit,
        ChangeStatus::Add,
        ChangeStatus::Delete,
        ChangeStatus::Rename,
    ] {
        if lower.contains(status.as_str()) {
            return status;
        }
    }
    ChangeStatus::None
}

/// Parses a `history /format:detailed` query.
///
/// Matches `Changeset: <int> Author: <text> Date: <text>` lines; the detailed
/// format carries no comment on that line, so `comment` stays absent.
pub fn parse_history(output: &str) -> Vec<HistoryItem> {
    output.lines().filter_map(parse_history_line).collect()
}

fn parse_history_line(line: &str) -> Option<HistoryItem> {
    let rest = line.trim().strip_prefix("Changeset:")?;
    let (id, rest) = rest.split_once("Author:")?;
    let changeset_id = id.trim().parse::<i64>().ok()?;
    let (author, date) = rest.split_once("Date:")?;
    let author = author.trim();
    let date = date.trim();
    if author.is_empty() || date.is_empty() {
        return None;
    }
    Some(HistoryItem {
        changeset_id,
        author: author.to_string(),
        date: date.to_string(),
        comment: None,
    })
}

/// Parses a `branches` query: one branch per `Branch: <text>` line.
pub fn parse_branches(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let name = line.trim().strip_prefix("Branch:")?.trim();
            if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            }
        })
        .collect()
}

/// Parses a `workfold` query. Collection URL, workspace name, and owner are
/// each extracted independently; a field missing from the output is simply
/// absent. The first match wins for each field.
pub fn parse_workspace_info(output: &str) -> WorkspaceInfo {
    let mut info = WorkspaceInfo::default();
    for line in output.lines() {
        let line = line.trim();
        if info.collection_url.is_none() {
            if let Some(url) = field(line, "Collection:") {
                info.collection_url = Some(url);
                continue;
            }
        }
        if info.workspace_name.is_none() {
            if let Some(name) = field(line, "Workspace:") {
                info.workspace_name = Some(name);
                continue;
            }
        }
        if info.owner.is_none() {
            if let Some(owner) = field(line, "Owner:") {
                info.owner = Some(owner);
            }
        }
    }
    info
}

fn field(line: &str, prefix: &str) -> Option<String> {
    let value = line.strip_prefix(prefix)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
