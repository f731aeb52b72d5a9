use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::audit::{AuditRequest, AuditResult, AuditVariant, StepProgress};
use crate::config::{AuditServiceConfig, EVENT_CHANNEL_CAPACITY};
use crate::error::{AuditError, ValidationError};
use crate::log_capture::LogState;
use crate::pipeline::AuditEvent;
use crate::settings::PersistentSettings;

pub type SharedState = Arc<AuditServiceState>;

pub struct AuditServiceState {
    pub config: AuditServiceConfig,
    pub settings: RwLock<PersistentSettings>,
    pub delay_scale: RwLock<f64>,
    pub audit: RwLock<AuditRunState>,
    pub logs: LogState,
    pub events_tx: broadcast::Sender<AuditEvent>,
    pub started_at: DateTime<Utc>,
}

impl AuditServiceState {
    pub fn new(config: AuditServiceConfig, settings: PersistentSettings) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let delay_scale = config.delay_scale;
        Self {
            config,
            settings: RwLock::new(settings),
            delay_scale: RwLock::new(delay_scale),
            audit: RwLock::new(AuditRunState::new()),
            logs: LogState::new(),
            events_tx,
            started_at: Utc::now(),
        }
    }

    pub fn publish(&self, event: AuditEvent) {
        // No subscribers is fine.
        let _ = self.events_tx.send(event);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Running,
    Completed,
}

/// Observable state of the current (or most recent) run.
pub struct AuditRunState {
    pub phase: RunPhase,
    pub run_id: Option<Uuid>,
    pub request: Option<AuditRequest>,
    pub current_step: Option<String>,
    pub step_index: usize,
    pub total_steps: usize,
    pub progress: f64,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_result: Option<AuditResult>,
}

impl Default for AuditRunState {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditRunState {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Idle,
            run_id: None,
            request: None,
            current_step: None,
            step_index: 0,
            total_steps: 0,
            progress: 0.0,
            started_at: None,
            completed_at: None,
            last_error: None,
            last_result: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    /// Moves to `Running` for a new run, refusing while another is active.
    pub fn try_begin(&mut self, request: &AuditRequest) -> Result<Uuid, AuditError> {
        if self.is_running() {
            return Err(AuditError::AlreadyRunning);
        }
        let run_id = Uuid::new_v4();
        self.phase = RunPhase::Running;
        self.run_id = Some(run_id);
        self.request = Some(request.clone());
        self.current_step = None;
        self.step_index = 0;
        self.total_steps = request.variant().steps().len();
        self.progress = 0.0;
        self.started_at = Some(Utc::now());
        self.completed_at = None;
        self.last_error = None;
        Ok(run_id)
    }

    pub fn record_step(&mut self, progress: &StepProgress) {
        self.current_step = Some(progress.label.to_string());
        self.step_index = progress.index;
        self.total_steps = progress.total;
        self.progress = progress.fraction;
    }

    pub fn complete(&mut self, result: AuditResult) {
        self.phase = RunPhase::Completed;
        self.current_step = None;
        self.progress = 1.0;
        self.completed_at = Some(Utc::now());
        self.last_result = Some(result);
    }

    /// Records why a request was refused. A rejected request never claimed the
    /// run slot, so whatever run is active or finished stays untouched.
    pub fn reject(&mut self, error: &ValidationError) {
        self.last_error = Some(error.to_string());
    }

    pub fn to_status(&self) -> AuditStatus {
        AuditStatus {
            phase: self.phase,
            loading: self.is_running(),
            run_id: self.run_id,
            url: self.request.as_ref().map(|r| r.url().to_string()),
            variant: self.request.as_ref().map(|r| r.variant()),
            current_step: self.current_step.clone(),
            step_index: self.step_index,
            total_steps: self.total_steps,
            progress: self.progress,
            started_at: self.started_at,
            completed_at: self.completed_at,
            last_error: self.last_error.clone(),
            has_result: self.last_result.is_some(),
        }
    }
}

// --- Read-only status for API responses ---

#[derive(Debug, Clone, Serialize)]
pub struct AuditStatus {
    pub phase: RunPhase,
    pub loading: bool,
    pub run_id: Option<Uuid>,
    pub url: Option<String>,
    pub variant: Option<AuditVariant>,
    pub current_step: Option<String>,
    pub step_index: usize,
    pub total_steps: usize,
    pub progress: f64,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub has_result: bool,
}
