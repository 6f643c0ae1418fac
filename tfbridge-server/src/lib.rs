//! # tfbridge-server
//!
//! Server library for tfbridge: the auto-checkout watcher and the HTTP API
//! editor collaborators consume.

pub mod api;
pub mod server;
pub mod watcher;

pub use server::TfBridgeServer;
pub use watcher::{AutoCheckoutOptions, AutoCheckoutWatcher};
