//! # tfbridge-sdk
//!
//! SDK for editor extensions and tools to integrate with a running tfbridge
//! daemon.
//!
//! ## Example
//!
//! ```no_run
//! use tfbridge_sdk::TfBridgeClient;
//!
//! let client = TfBridgeClient::new("http://localhost:3030");
//!
//! // Relay an editor save so the bridge can auto-checkout the file
//! client.document_saved("src/main.rs").unwrap();
//!
//! // Exclude a file from the next checkin
//! client.set_inclusion("docs/notes.txt", false).unwrap();
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone)]
pub struct TfBridgeClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct SignalRequest<'a> {
    path: &'a str,
}

#[derive(Serialize)]
struct InclusionRequest<'a> {
    path: &'a str,
    included: Option<bool>,
}

#[derive(Serialize)]
struct CheckinRequest<'a> {
    paths: &'a [String],
    comment: &'a str,
}

/// Inclusion state of one pending change as reported by the daemon.
#[derive(Deserialize)]
pub struct InclusionState {
    pub path: String,
    pub included: bool,
}

impl TfBridgeClient {
    /// Create a new bridge client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the bridge daemon (e.g., "http://localhost:3030")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Relay an editor document-changed signal
    pub fn document_changed(&self, path: &str) -> Result<()> {
        self.signal("document-changed", path)
    }

    /// Relay an editor document-saved signal
    pub fn document_saved(&self, path: &str) -> Result<()> {
        self.signal("document-saved", path)
    }

    fn signal(&self, kind: &str, path: &str) -> Result<()> {
        self.client
            .post(format!("{}/signals/{}", self.base_url, kind))
            .json(&SignalRequest { path })
            .send()?
            .error_for_status()?;
        Ok(())
    }

    /// Get the current pending changes
    pub fn pending_changes(&self) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let response = self
            .client
            .get(format!("{}/changes", self.base_url))
            .send()?
            .error_for_status()?;

        Ok(response.json()?)
    }

    /// Ask the daemon to re-query the external tool for pending changes
    pub fn refresh(&self) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let response = self
            .client
            .post(format!("{}/changes/refresh", self.base_url))
            .send()?
            .error_for_status()?;

        Ok(response.json()?)
    }

    /// Set the inclusion flag of a pending change
    pub fn set_inclusion(&self, path: &str, included: bool) -> Result<InclusionState> {
        self.inclusion(path, Some(included))
    }

    /// Toggle the inclusion flag of a pending change
    pub fn toggle_inclusion(&self, path: &str) -> Result<InclusionState> {
        self.inclusion(path, None)
    }

    fn inclusion(&self, path: &str, included: Option<bool>) -> Result<InclusionState> {
        let response = self
            .client
            .post(format!("{}/changes/inclusion", self.base_url))
            .json(&InclusionRequest { path, included })
            .send()?
            .error_for_status()?;

        Ok(response.json()?)
    }

    /// Check in the given paths, or every included pending change when
    /// `paths` is empty
    pub fn checkin(&self, paths: &[String], comment: &str) -> Result<()> {
        self.client
            .post(format!("{}/checkin", self.base_url))
            .json(&CheckinRequest { paths, comment })
            .send()?
            .error_for_status()?;
        Ok(())
    }

    /// Fetch the daemon's diagnostics report
    pub fn diagnostics(&self) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/diagnostics", self.base_url))
            .send()?
            .error_for_status()?;

        Ok(response.text()?)
    }

    /// Check daemon health
    pub fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()?;

        Ok(response.status().is_success())
    }
}
