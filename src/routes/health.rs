use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::{RunPhase, SharedState};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub phase: RunPhase,
    pub uptime_secs: i64,
    pub delay_scale: f64,
}

/// Overall status string for a run phase.
pub fn determine_overall_status(phase: RunPhase) -> &'static str {
    match phase {
        RunPhase::Running => "auditing",
        RunPhase::Idle | RunPhase::Completed => "idle",
    }
}

pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let phase = state.audit.read().await.phase;
    let delay_scale = *state.delay_scale.read().await;
    Json(HealthResponse {
        status: determine_overall_status(phase).to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        phase,
        uptime_secs: (chrono::Utc::now() - state.started_at).num_seconds(),
        delay_scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auditing_while_running() {
        assert_eq!(determine_overall_status(RunPhase::Running), "auditing");
    }

    #[test]
    fn test_idle_otherwise() {
        assert_eq!(determine_overall_status(RunPhase::Idle), "idle");
        assert_eq!(determine_overall_status(RunPhase::Completed), "idle");
    }

    #[test]
    fn test_health_response_serializes_to_json() {
        let response = HealthResponse {
            status: "idle".to_string(),
            version: "0.1.0".to_string(),
            phase: RunPhase::Completed,
            uptime_secs: 12,
            delay_scale: 1.0,
        };
        let json = serde_json::to_string(&response).expect("should serialize");
        assert!(json.contains("\"status\":\"idle\""));
        assert!(json.contains("\"phase\":\"completed\""));
    }
}
