use crate::watcher::{AutoCheckoutOptions, AutoCheckoutWatcher};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tfbridge_core::{
    CommandResult, DiagnosticsReporter, Error, FilesetManager, HistoryItem, PendingChange,
    TfvcClient, WorkspaceInfo,
};
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<TfvcClient>,
    pub fileset: Arc<FilesetManager>,
    pub watcher: Arc<AutoCheckoutWatcher>,
    pub reporter: Arc<DiagnosticsReporter>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/changes", get(get_changes))
        .route("/changes/refresh", post(refresh_changes))
        .route("/changes/inclusion", post(set_inclusion))
        .route("/changes/summary", get(get_summary))
        .route("/checkin", post(checkin))
        .route("/checkout", post(checkout))
        .route("/history", get(get_history))
        .route("/branches", get(get_branches))
        .route("/shelvesets", post(create_shelveset))
        .route("/shelvesets/apply", post(apply_shelveset))
        .route("/workspace", get(get_workspace))
        .route("/diagnostics", get(get_diagnostics))
        .route("/signals/document-changed", post(document_changed))
        .route("/signals/document-saved", post(document_saved))
        .route("/config/auto-checkout", post(configure_auto_checkout))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn map_error(e: Error) -> (StatusCode, String) {
    let status = match &e {
        Error::InvalidOperation(_) => StatusCode::BAD_REQUEST,
        Error::Workspace(_) | Error::Configuration(_) => StatusCode::PRECONDITION_FAILED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

async fn get_changes(State(state): State<AppState>) -> Json<Vec<PendingChange>> {
    Json(state.fileset.all_files())
}

async fn refresh_changes(
    State(state): State<AppState>,
) -> Result<Json<Vec<PendingChange>>, (StatusCode, String)> {
    state
        .client
        .refresh_pending_changes()
        .await
        .map(Json)
        .map_err(map_error)
}

#[derive(Deserialize)]
struct InclusionRequest {
    path: String,
    /// Explicit flag to set; omitted means toggle.
    included: Option<bool>,
}

async fn set_inclusion(
    State(state): State<AppState>,
    Json(req): Json<InclusionRequest>,
) -> Json<serde_json::Value> {
    match req.included {
        Some(included) => state.fileset.set_file_inclusion(&req.path, included),
        None => state.fileset.toggle_file_inclusion(&req.path),
    }
    Json(serde_json::json!({
        "path": req.path,
        "included": state.fileset.is_file_included(&req.path),
    }))
}

async fn get_summary(State(state): State<AppState>) -> Json<serde_json::Value> {
    let all = state.fileset.all_files();
    let included = state.fileset.included_files().len();
    let by_status: serde_json::Map<String, serde_json::Value> = state
        .fileset
        .status_counts()
        .into_iter()
        .map(|(status, count)| (status.as_str().to_string(), count.into()))
        .collect();

    Json(serde_json::json!({
        "total": all.len(),
        "included": included,
        "excluded": all.len() - included,
        "by_status": by_status,
    }))
}

#[derive(Deserialize)]
struct CheckinRequest {
    #[serde(default)]
    paths: Vec<String>,
    comment: String,
}

async fn checkin(
    State(state): State<AppState>,
    Json(req): Json<CheckinRequest>,
) -> Result<Json<CommandResult>, (StatusCode, String)> {
    state
        .client
        .checkin(&req.paths, &req.comment)
        .await
        .map(Json)
        .map_err(map_error)
}

#[derive(Deserialize)]
struct CheckoutRequest {
    path: String,
}

async fn checkout(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CommandResult>, (StatusCode, String)> {
    state
        .client
        .checkout(&req.path)
        .await
        .map(Json)
        .map_err(map_error)
}

#[derive(Deserialize)]
struct HistoryQuery {
    path: String,
}

async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryItem>>, (StatusCode, String)> {
    state
        .client
        .history(&query.path)
        .await
        .map(Json)
        .map_err(map_error)
}

async fn get_branches(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, (StatusCode, String)> {
    state.client.branches().await.map(Json).map_err(map_error)
}

#[derive(Deserialize)]
struct CreateShelvesetRequest {
    name: String,
    comment: String,
    #[serde(default)]
    paths: Vec<String>,
}

async fn create_shelveset(
    State(state): State<AppState>,
    Json(req): Json<CreateShelvesetRequest>,
) -> Result<Json<CommandResult>, (StatusCode, String)> {
    state
        .client
        .create_shelveset(&req.name, &req.comment, &req.paths)
        .await
        .map(Json)
        .map_err(map_error)
}

#[derive(Deserialize)]
struct ApplyShelvesetRequest {
    name: String,
    owner: String,
}

async fn apply_shelveset(
    State(state): State<AppState>,
    Json(req): Json<ApplyShelvesetRequest>,
) -> Result<Json<CommandResult>, (StatusCode, String)> {
    state
        .client
        .apply_shelveset(&req.name, &req.owner)
        .await
        .map(Json)
        .map_err(map_error)
}

async fn get_workspace(
    State(state): State<AppState>,
) -> Result<Json<WorkspaceInfo>, (StatusCode, String)> {
    state
        .client
        .workspace_info()
        .await
        .map(Json)
        .map_err(map_error)
}

async fn get_diagnostics(State(state): State<AppState>) -> String {
    state.reporter.generate().await
}

#[derive(Deserialize)]
struct SignalRequest {
    path: String,
}

/// Editor signals are fire-and-forget: the save/change pipeline must never
/// wait on a checkout.
async fn document_changed(
    State(state): State<AppState>,
    Json(req): Json<SignalRequest>,
) -> StatusCode {
    let watcher = Arc::clone(&state.watcher);
    tokio::spawn(async move { watcher.handle_document_changed(&req.path).await });
    StatusCode::ACCEPTED
}

async fn document_saved(
    State(state): State<AppState>,
    Json(req): Json<SignalRequest>,
) -> StatusCode {
    let watcher = Arc::clone(&state.watcher);
    tokio::spawn(async move { watcher.handle_document_saved(&req.path).await });
    StatusCode::ACCEPTED
}

#[derive(Deserialize)]
struct AutoCheckoutConfigRequest {
    enabled: bool,
    #[serde(default)]
    on_save_only: bool,
}

async fn configure_auto_checkout(
    State(state): State<AppState>,
    Json(req): Json<AutoCheckoutConfigRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .watcher
        .reconfigure(AutoCheckoutOptions {
            enabled: req.enabled,
            on_save_only: req.on_save_only,
        })
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}
