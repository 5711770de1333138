use crate::{dto::ReloadResponse, errors::ApiError, state::AppState};
use axum::{extract::State, Json};
use tracing::{error, info, instrument};

#[instrument(skip(state), name = "api_reload_config")]
pub async fn reload_config(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, ApiError> {
    info!("Config reload requested");

    let config = state.reload_config.execute().await.map_err(|e| {
        error!(error = %e, "Config reload failed");
        ApiError(e)
    })?;

    Ok(Json(ReloadResponse {
        success: true,
        hosts: config.hosts.len(),
        message: "Configuration reloaded; the next probe cycle uses it".to_string(),
    }))
}
