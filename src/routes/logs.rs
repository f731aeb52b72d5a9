use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::log_capture::{LogEntry, LogFilter, LogLevel, LogSource};
use crate::state::SharedState;

const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub source: Option<LogSource>,
    pub level: Option<LogLevel>,
    pub run_id: Option<Uuid>,
}

fn default_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl From<&HistoryQuery> for LogFilter {
    fn from(q: &HistoryQuery) -> Self {
        LogFilter {
            source: q.source,
            level: q.level,
            run_id: q.run_id,
        }
    }
}

#[derive(Serialize)]
pub struct HistoryResponse {
    /// Newest first.
    pub entries: Vec<LogEntry>,
    /// Entries matching the filter, before `limit` applies.
    pub matched: usize,
    pub limit: usize,
}

/// GET /logs/history: buffered entries, optionally narrowed to one run, source or level.
pub async fn log_history(
    State(state): State<SharedState>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let (entries, matched) = state.logs.recent(&LogFilter::from(&query), query.limit).await;
    Json(HistoryResponse {
        entries,
        matched,
        limit: query.limit,
    })
}

/// GET /logs/stream: live entries as SSE, with the same filters as history.
pub async fn log_stream(
    State(state): State<SharedState>,
    Query(filter): Query<LogFilter>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.logs.subscribe());

    let event_stream = stream.filter_map(move |result| match result {
        Ok(entry) if filter.matches(&entry) => {
            let data = serde_json::to_string(&entry).unwrap_or_default();
            Some(Ok(Event::default().event("log").data(data)))
        }
        // Lagged receivers skip what they missed.
        _ => None,
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}
