use axum::extract::State;
use axum::Json;

use crate::log_capture::{LogLevel, LogSource};
use crate::settings::{save_settings, PersistentSettings};
use crate::state::SharedState;

/// GET /settings
pub async fn get_settings(State(state): State<SharedState>) -> Json<PersistentSettings> {
    Json(state.settings.read().await.clone())
}

/// PUT /settings: replace settings, re-resolve pacing, persist if a path is configured.
///
/// A `--delay-scale` given at startup keeps precedence over the stored value.
pub async fn put_settings(
    State(state): State<SharedState>,
    Json(settings): Json<PersistentSettings>,
) -> Json<PersistentSettings> {
    let scale = state.config.effective_delay_scale(&settings);
    *state.delay_scale.write().await = scale;

    if let Some(path) = &state.config.settings_path {
        save_settings(path, &settings);
    }

    *state.settings.write().await = settings.clone();

    state
        .logs
        .emit(
            LogSource::Api,
            LogLevel::Info,
            format!("Settings updated (delay scale {})", scale),
        )
        .await;

    Json(settings)
}
