use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::audit::{AuditRequest, AuditResult, AuditVariant};
use crate::error::AuditError;
use crate::pipeline;
use crate::state::{AuditStatus, SharedState};

/// POST /audit/start
pub async fn start(
    State(state): State<SharedState>,
    Json(request): Json<AuditRequest>,
) -> Result<impl IntoResponse, AuditError> {
    let url = request.url().to_string();
    let variant = request.variant();
    let total_steps = variant.steps().len();

    let run_id = pipeline::start_audit(&state, request).await?;

    Ok(Json(serde_json::json!({
        "status": "started",
        "run_id": run_id,
        "url": url,
        "variant": variant,
        "total_steps": total_steps,
    })))
}

/// GET /audit/status
pub async fn status(State(state): State<SharedState>) -> Json<AuditStatus> {
    let audit = state.audit.read().await;
    Json(audit.to_status())
}

/// GET /audit/result: most recent completed result.
pub async fn result(State(state): State<SharedState>) -> Result<Json<AuditResult>, AuditError> {
    let audit = state.audit.read().await;
    audit
        .last_result
        .clone()
        .map(Json)
        .ok_or(AuditError::NoResult)
}

#[derive(Deserialize)]
pub struct StepsQuery {
    #[serde(default)]
    pub variant: AuditVariant,
}

/// GET /audit/steps?variant=enhanced
pub async fn steps(Query(query): Query<StepsQuery>) -> Json<serde_json::Value> {
    let steps = query.variant.steps();
    Json(serde_json::json!({
        "variant": query.variant,
        "steps": steps,
        "total": steps.len(),
    }))
}

/// GET /audit/defaults: initial state of the enhanced form.
pub async fn defaults(State(state): State<SharedState>) -> impl IntoResponse {
    let settings = state.settings.read().await;
    Json(settings.default_config())
}

/// GET /audit/stream: SSE stream of run events.
pub async fn stream(
    State(state): State<SharedState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events_tx.subscribe();
    let stream = BroadcastStream::new(rx);

    let event_stream = stream.filter_map(|result| match result {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().event(event.name()).data(data)))
        }
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}
