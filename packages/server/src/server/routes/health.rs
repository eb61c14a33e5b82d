use axum::{extract::Extension, Json};
use serde_json::{json, Value};

use crate::server::app::AxumAppState;

/// Health check endpoint
pub async fn health_handler(Extension(state): Extension<AxumAppState>) -> Json<Value> {
    let runs = state.server_deps.runs.len().await;
    Json(json!({ "status": "ok", "runs": runs }))
}
