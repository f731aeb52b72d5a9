use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::config::LOG_BUFFER_SIZE;

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub source: LogSource,
    pub level: LogLevel,
    /// Set for lines produced on behalf of one audit run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    /// Service lifecycle and run admission.
    Service,
    /// Step progress and outcomes of a run.
    Runner,
    /// Changes made through the HTTP API.
    Api,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

/// Narrows history and live entries. Unset fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogFilter {
    pub source: Option<LogSource>,
    pub level: Option<LogLevel>,
    pub run_id: Option<Uuid>,
}

impl LogFilter {
    pub fn for_run(run_id: Uuid) -> Self {
        Self {
            run_id: Some(run_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.source.map_or(true, |s| s == entry.source)
            && self.level.map_or(true, |l| l == entry.level)
            && self.run_id.map_or(true, |id| entry.run_id == Some(id))
    }
}

/// Bounded history of service log entries plus a live feed.
pub struct LogState {
    buffer: RwLock<VecDeque<LogEntry>>,
    capacity: usize,
    sender: broadcast::Sender<LogEntry>,
}

impl Default for LogState {
    fn default() -> Self {
        Self::new()
    }
}

impl LogState {
    pub fn new() -> Self {
        Self::with_capacity(LOG_BUFFER_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(256);
        Self {
            buffer: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
            sender,
        }
    }

    async fn push(&self, entry: LogEntry) {
        let mut buf = self.buffer.write().await;
        if buf.len() >= self.capacity {
            buf.pop_front();
        }
        buf.push_back(entry.clone());
        drop(buf);

        let _ = self.sender.send(entry);
    }

    /// Everything still buffered, oldest first.
    pub async fn history(&self) -> Vec<LogEntry> {
        self.buffer.read().await.iter().cloned().collect()
    }

    /// Up to `limit` matching entries, newest first, plus how many matched in total.
    pub async fn recent(&self, filter: &LogFilter, limit: usize) -> (Vec<LogEntry>, usize) {
        let buf = self.buffer.read().await;
        let matching = buf.iter().rev().filter(|e| filter.matches(e));
        let matched = matching.clone().count();
        (matching.take(limit).cloned().collect(), matched)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }

    pub async fn emit(&self, source: LogSource, level: LogLevel, message: impl Into<String>) {
        self.record(None, source, level, message.into()).await;
    }

    /// Like [`emit`](Self::emit), tagged with the run the line belongs to.
    pub async fn emit_for_run(
        &self,
        run_id: Uuid,
        source: LogSource,
        level: LogLevel,
        message: impl Into<String>,
    ) {
        self.record(Some(run_id), source, level, message.into()).await;
    }

    async fn record(
        &self,
        run_id: Option<Uuid>,
        source: LogSource,
        level: LogLevel,
        message: String,
    ) {
        self.push(LogEntry {
            timestamp: Utc::now(),
            source,
            level,
            run_id,
            message,
        })
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_history_is_bounded() {
        let logs = LogState::with_capacity(3);
        for i in 0..5 {
            logs.emit(LogSource::Service, LogLevel::Info, format!("entry {}", i))
                .await;
        }
        let history = logs.history().await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].message, "entry 2");
        assert_eq!(history[2].message, "entry 4");
    }

    #[tokio::test]
    async fn test_subscribers_receive_new_entries() {
        let logs = LogState::new();
        let mut rx = logs.subscribe();
        logs.emit(LogSource::Runner, LogLevel::Warn, "rejected").await;
        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.source, LogSource::Runner);
        assert_eq!(entry.level, LogLevel::Warn);
        assert!(entry.run_id.is_none());
        assert_eq!(entry.message, "rejected");
    }

    #[tokio::test]
    async fn test_recent_filters_by_run_and_source() {
        let logs = LogState::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        logs.emit(LogSource::Service, LogLevel::Info, "starting").await;
        logs.emit_for_run(first, LogSource::Service, LogLevel::Info, "a started")
            .await;
        logs.emit_for_run(first, LogSource::Runner, LogLevel::Debug, "a step 1")
            .await;
        logs.emit_for_run(second, LogSource::Runner, LogLevel::Debug, "b step 1")
            .await;
        logs.emit_for_run(first, LogSource::Runner, LogLevel::Info, "a done")
            .await;

        let (entries, matched) = logs.recent(&LogFilter::for_run(first), 10).await;
        assert_eq!(matched, 3);
        let messages: Vec<_> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["a done", "a step 1", "a started"]);

        let runner_only = LogFilter {
            source: Some(LogSource::Runner),
            ..Default::default()
        };
        let (entries, matched) = logs.recent(&runner_only, 1).await;
        assert_eq!(matched, 3);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "a done");

        let debug_for_first = LogFilter {
            level: Some(LogLevel::Debug),
            run_id: Some(first),
            ..Default::default()
        };
        let (entries, _) = logs.recent(&debug_for_first, 10).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "a step 1");
    }

    #[test]
    fn test_filter_deserializes_from_query_values() {
        let filter: LogFilter =
            serde_json::from_str(r#"{"source":"runner","level":"warn"}"#).unwrap();
        assert_eq!(filter.source, Some(LogSource::Runner));
        assert_eq!(filter.level, Some(LogLevel::Warn));
        assert!(filter.run_id.is_none());
    }

    #[test]
    fn test_entry_serializes_lowercase() {
        let entry = LogEntry {
            timestamp: Utc::now(),
            source: LogSource::Api,
            level: LogLevel::Error,
            run_id: None,
            message: "boom".to_string(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"source\":\"api\""));
        assert!(json.contains("\"level\":\"error\""));
        assert!(!json.contains("run_id"));
    }
}
