use crate::{dto::HealthResponse, state::AppState};
use axum::{extract::State, Json};

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        probe_running: state
            .probe_cycle
            .as_ref()
            .is_some_and(|cycle| cycle.is_running()),
    })
}
