//! SSE streaming endpoint.
//!
//! GET /api/runs/:id/stream
//!
//! Every message is a plain `data: <json>` frame whose payload carries a
//! `type` field. The first is `snapshot` (the full run), then `progress`,
//! `log`, and finally `done` or `error`, after which the server closes the
//! stream. A client that falls behind receives a fresh `snapshot`.

use std::convert::Infallible;

use axum::{
    extract::{Extension, Path},
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::StreamExt;
use tracing::warn;

use crate::domains::runs::StreamMessage;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;

/// SSE stream handler.
///
/// Unknown runs are rejected with 404 before the stream opens.
pub async fn stream_run_handler(
    Extension(state): Extension<AxumAppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let run = state.server_deps.runs.get_str(&id).await?;
    let subscription = run.subscribe().await;

    let events = subscription
        .into_stream()
        .filter_map(|message| encode_message(&message).map(Ok::<_, Infallible>));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Encode one message as a data-only SSE frame.
///
/// A message that fails to encode is logged and skipped, except a terminal
/// one, which is replaced by its reduced form so observers still see the end.
pub(crate) fn encode_message(message: &StreamMessage) -> Option<Event> {
    let encoded = message
        .to_json()
        .map_err(|e| e.to_string())
        .and_then(|payload| Event::default().json_data(payload).map_err(|e| e.to_string()));

    match encoded {
        Ok(event) => Some(event),
        Err(error) => {
            warn!(
                error = %error,
                kind = message.event_name(),
                terminal = message.is_terminal(),
                "Failed to encode stream message"
            );
            let fallback = message.fallback_json()?;
            Event::default().json_data(fallback).ok()
        }
    }
}
