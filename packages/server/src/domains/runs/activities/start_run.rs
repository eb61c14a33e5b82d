use std::sync::Arc;

use secrecy::SecretString;
use serde::Deserialize;

use crate::domains::runs::activities::spawn_run;
use crate::domains::runs::handle::RunHandle;
use crate::domains::runs::models::RunMode;
use crate::domains::runs::RunError;
use crate::kernel::ServerDeps;

/// Body of a start request. Both fields are optional on the wire;
/// validation happens in [`start_run`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRunRequest {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, alias = "api_key")]
    pub api_key: Option<String>,
}

impl StartRunRequest {
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn advanced(api_key: impl Into<String>) -> Self {
        Self {
            mode: Some("advanced".to_string()),
            api_key: Some(api_key.into()),
        }
    }
}

fn parse_mode(mode: Option<&str>) -> Result<RunMode, RunError> {
    match mode.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("standard") => Ok(RunMode::Standard),
        Some("advanced") => Ok(RunMode::Advanced),
        Some(other) => Err(RunError::InvalidRequest(format!(
            "unknown mode '{}', expected 'standard' or 'advanced'",
            other
        ))),
    }
}

/// Validate the request, register a run and start it in the background.
///
/// Invalid requests are rejected before anything is registered.
pub async fn start_run(
    deps: &Arc<ServerDeps>,
    request: StartRunRequest,
) -> Result<Arc<RunHandle>, RunError> {
    let mode = parse_mode(request.mode.as_deref())?;
    let api_key = request.api_key.filter(|key| !key.trim().is_empty());

    let credential = match (mode, api_key) {
        (RunMode::Advanced, None) => {
            return Err(RunError::InvalidRequest(
                "advanced mode requires an API key".to_string(),
            ))
        }
        (RunMode::Advanced, Some(key)) => Some(SecretString::from(key)),
        (RunMode::Standard, _) => None,
    };

    let run = deps.runs.create(mode).await;
    spawn_run(deps.clone(), run.clone(), credential);
    Ok(run)
}
