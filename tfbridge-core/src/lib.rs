//! # tfbridge-core
//!
//! Core library for tfbridge - command orchestration and state
//! synchronization against an external version-control command-line client.
//!
//! This crate provides the subprocess execution layer, the defensive output
//! parsers, the pending-change fileset, the bounded command history, and the
//! diagnostics reporter.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod executor;
pub mod fileset;
pub mod history;
pub mod models;
pub mod parser;
pub mod tfvc;

pub use config::Config;
pub use diagnostics::DiagnosticsReporter;
pub use error::{Error, Result};
pub use executor::CommandExecutor;
pub use fileset::FilesetManager;
pub use history::CommandHistoryLog;
pub use models::{
    ChangeStatus, CommandHistoryEntry, CommandResult, HistoryItem, PendingChange, WorkspaceInfo,
};
pub use tfvc::TfvcClient;
