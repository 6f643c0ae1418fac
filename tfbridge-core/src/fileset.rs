//! Pending-change fileset: the single source of truth for what will be
//! checked in or shelved.

use crate::models::{ChangeStatus, PendingChange};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Owns the current set of pending changes and their inclusion flags, and
/// fires a payload-free notification whenever the set changes. Subscribers
/// re-read full state on every notification.
///
/// Constructed once by the composition root and shared by reference; there is
/// exactly one instance per process.
pub struct FilesetManager {
    changes: Mutex<HashMap<String, PendingChange>>,
    notifier: Mutex<Option<broadcast::Sender<()>>>,
}

impl FilesetManager {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            changes: Mutex::new(HashMap::new()),
            notifier: Mutex::new(Some(tx)),
        }
    }

    /// Subscribes to change notifications. After `dispose` the returned
    /// receiver is already closed.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        match self.notifier.lock().unwrap().as_ref() {
            Some(tx) => tx.subscribe(),
            None => broadcast::channel(1).1,
        }
    }

    fn notify(&self) {
        if let Some(tx) = self.notifier.lock().unwrap().as_ref() {
            // No receivers is fine; state is re-read on demand anyway.
            let _ = tx.send(());
        }
    }

    /// Replaces the entire set. A fresh refresh always starts fully included,
    /// regardless of any prior inclusion state.
    pub fn set_pending_changes(&self, changes: Vec<PendingChange>) {
        {
            let mut map = self.changes.lock().unwrap();
            map.clear();
            for mut change in changes {
                change.is_included = true;
                map.insert(change.path.clone(), change);
            }
        }
        self.notify();
    }

    /// Flips the inclusion flag for `path`. Silently does nothing if the path
    /// is not a pending change.
    pub fn toggle_file_inclusion(&self, path: &str) {
        let toggled = {
            let mut map = self.changes.lock().unwrap();
            match map.get_mut(path) {
                Some(change) => {
                    change.is_included = !change.is_included;
                    true
                }
                None => false,
            }
        };
        if toggled {
            self.notify();
        }
    }

    /// Sets the inclusion flag for `path`. Silently does nothing if the path
    /// is not a pending change.
    pub fn set_file_inclusion(&self, path: &str, included: bool) {
        let updated = {
            let mut map = self.changes.lock().unwrap();
            match map.get_mut(path) {
                Some(change) => {
                    change.is_included = included;
                    true
                }
                None => false,
            }
        };
        if updated {
            self.notify();
        }
    }

    pub fn is_file_included(&self, path: &str) -> bool {
        self.changes
            .lock()
            .unwrap()
            .get(path)
            .map(|c| c.is_included)
            .unwrap_or(false)
    }

    pub fn included_files(&self) -> Vec<PendingChange> {
        self.snapshot(|c| c.is_included)
    }

    pub fn excluded_files(&self) -> Vec<PendingChange> {
        self.snapshot(|c| !c.is_included)
    }

    pub fn all_files(&self) -> Vec<PendingChange> {
        self.snapshot(|_| true)
    }

    fn snapshot(&self, filter: impl Fn(&PendingChange) -> bool) -> Vec<PendingChange> {
        let mut files: Vec<PendingChange> = self
            .changes
            .lock()
            .unwrap()
            .values()
            .filter(|c| filter(c))
            .cloned()
            .collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Per-status entry counts, for the diagnostics breakdown.
    pub fn status_counts(&self) -> Vec<(ChangeStatus, usize)> {
        let map = self.changes.lock().unwrap();
        [
            ChangeStatus::Add,
            ChangeStatus::Edit,
            ChangeStatus::Delete,
            ChangeStatus::Rename,
            ChangeStatus::None,
        ]
        .into_iter()
        .map(|status| (status, map.values().filter(|c| c.status == status).count()))
        .filter(|(_, count)| *count > 0)
        .collect()
    }

    /// Empties the set and fires a single notification.
    pub fn clear(&self) {
        self.changes.lock().unwrap().clear();
        self.notify();
    }

    /// Releases the notification channel and clears state. Safe to call once
    /// at shutdown; every outstanding receiver observes a closed channel.
    pub fn dispose(&self) {
        self.notifier.lock().unwrap().take();
        self.changes.lock().unwrap().clear();
    }
}

impl Default for FilesetManager {
    fn default() -> Self {
        Self::new()
    }
}
