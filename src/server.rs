use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(crate::routes::health::health))
        // Audit lifecycle
        .route("/audit/start", post(crate::routes::audit::start))
        .route("/audit/status", get(crate::routes::audit::status))
        .route("/audit/result", get(crate::routes::audit::result))
        .route("/audit/stream", get(crate::routes::audit::stream))
        .route("/audit/steps", get(crate::routes::audit::steps))
        .route("/audit/defaults", get(crate::routes::audit::defaults))
        // Logs
        .route("/logs/history", get(crate::routes::logs::log_history))
        .route("/logs/stream", get(crate::routes::logs::log_stream))
        // Settings
        .route(
            "/settings",
            get(crate::routes::settings::get_settings).put(crate::routes::settings::put_settings),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
