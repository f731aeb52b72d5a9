use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::audit::{
    AuditRequest, AuditResult, AuditRunner, AuditVariant, ProgressObserver, StepProgress,
};
use crate::error::{AuditError, ValidationError};
use crate::log_capture::{LogLevel, LogSource};
use crate::state::SharedState;

/// Broadcast to stream subscribers as a run advances.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    Started {
        run_id: Uuid,
        url: String,
        variant: AuditVariant,
        total_steps: usize,
    },
    Progress {
        run_id: Uuid,
        #[serde(flatten)]
        progress: StepProgress,
    },
    Completed {
        run_id: Uuid,
        result: AuditResult,
    },
    Rejected {
        reason: String,
    },
}

impl AuditEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AuditEvent::Started { .. } => "started",
            AuditEvent::Progress { .. } => "progress",
            AuditEvent::Completed { .. } => "completed",
            AuditEvent::Rejected { .. } => "rejected",
        }
    }
}

/// Mirrors runner callbacks into the shared run state and the event channel.
pub struct StateObserver {
    state: SharedState,
    run_id: Uuid,
}

impl StateObserver {
    pub fn new(state: SharedState, run_id: Uuid) -> Self {
        Self { state, run_id }
    }
}

#[async_trait]
impl ProgressObserver for StateObserver {
    async fn on_step(&mut self, progress: &StepProgress) {
        self.state.audit.write().await.record_step(progress);
        self.state
            .logs
            .emit_for_run(
                self.run_id,
                LogSource::Runner,
                LogLevel::Debug,
                format!(
                    "[{}/{}] {} ({}%)",
                    progress.index + 1,
                    progress.total,
                    progress.label,
                    progress.percent()
                ),
            )
            .await;
        self.state.publish(AuditEvent::Progress {
            run_id: self.run_id,
            progress: progress.clone(),
        });
    }

    async fn on_complete(&mut self, result: &AuditResult) {
        self.state.audit.write().await.complete(result.clone());
        self.state
            .logs
            .emit_for_run(
                self.run_id,
                LogSource::Runner,
                LogLevel::Info,
                format!(
                    "Audit of {} completed: overall score {}",
                    result.url,
                    result.overall_score()
                ),
            )
            .await;
        self.state.publish(AuditEvent::Completed {
            run_id: self.run_id,
            result: result.clone(),
        });
    }

    async fn on_rejected(&mut self, error: &ValidationError) {
        record_rejection(&self.state, error).await;
    }
}

async fn record_rejection(state: &SharedState, error: &ValidationError) {
    state.audit.write().await.reject(error);
    state
        .logs
        .emit(
            LogSource::Runner,
            LogLevel::Warn,
            format!("Audit rejected: {}", error),
        )
        .await;
    state.publish(AuditEvent::Rejected {
        reason: error.to_string(),
    });
}

/// Validates `request`, claims the single run slot and spawns the run.
///
/// Validation failures are reported before any state transition; an active run
/// makes this return `AlreadyRunning` without touching it.
pub async fn start_audit(state: &SharedState, request: AuditRequest) -> Result<Uuid, AuditError> {
    if let Err(e) = AuditRunner::validate(&request) {
        warn!("Rejecting audit of '{}': {}", request.url(), e);
        record_rejection(state, &e).await;
        return Err(e.into());
    }

    let run_id = state.audit.write().await.try_begin(&request)?;
    let variant = request.variant();
    let total_steps = variant.steps().len();

    info!(
        "Audit {} queued: url={}, variant={}",
        run_id,
        request.url(),
        variant
    );
    state
        .logs
        .emit_for_run(
            run_id,
            LogSource::Service,
            LogLevel::Info,
            format!("Audit started: {} ({})", request.url(), variant),
        )
        .await;
    state.publish(AuditEvent::Started {
        run_id,
        url: request.url().to_string(),
        variant,
        total_steps,
    });

    let runner = AuditRunner::new(*state.delay_scale.read().await);
    let state_clone = state.clone();
    tokio::spawn(async move {
        let mut observer = StateObserver::new(state_clone, run_id);
        // Outcome is delivered through the observer.
        let _ = runner.run(request, &mut observer).await;
    });

    Ok(run_id)
}
