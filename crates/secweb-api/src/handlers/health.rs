use axum::{extract::State, http::StatusCode, Json};

use crate::response::HealthResponse;
use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            active_sessions: state.sessions.store().len(),
        }),
    )
}
