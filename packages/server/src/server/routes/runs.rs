//! Run endpoints.
//!
//! POST /api/runs        start a run
//! GET  /api/runs        list runs, newest first
//! GET  /api/runs/:id    full snapshot

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::domains::runs::{
    start_run, RunId, RunMode, RunSnapshot, RunStatus, RunSummary, StartRunRequest,
};
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRunResponse {
    pub id: RunId,
    pub mode: RunMode,
    pub status: RunStatus,
    pub stream_url: String,
}

pub async fn start_run_handler(
    Extension(state): Extension<AxumAppState>,
    payload: Result<Json<StartRunRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StartRunResponse>), ApiError> {
    let Json(request) = payload?;
    let run = start_run(&state.server_deps, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(StartRunResponse {
            id: run.id(),
            mode: run.mode(),
            status: run.status().await,
            stream_url: format!("/api/runs/{}/stream", run.id()),
        }),
    ))
}

pub async fn list_runs_handler(
    Extension(state): Extension<AxumAppState>,
) -> Json<Vec<RunSummary>> {
    Json(state.server_deps.runs.list().await)
}

pub async fn get_run_handler(
    Extension(state): Extension<AxumAppState>,
    Path(id): Path<String>,
) -> Result<Json<RunSnapshot>, ApiError> {
    let run = state.server_deps.runs.get_str(&id).await?;
    Ok(Json(run.snapshot().await))
}
