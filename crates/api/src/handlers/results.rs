use crate::{dto::PublishResponse, errors::ApiError, state::AppState};
use axum::{extract::State, Json};
use steer_dns_domain::{DomainError, ProbeCycleResult};
use tracing::{debug, info, instrument};

/// Accepts a result measured by a remote tester and publishes it exactly
/// like a local cycle would.
#[instrument(skip(state, result), name = "api_push_results")]
pub async fn push_results(
    State(state): State<AppState>,
    Json(result): Json<ProbeCycleResult>,
) -> Result<Json<PublishResponse>, ApiError> {
    if result.is_empty() {
        return Err(DomainError::SerializationError("result has no hosts".to_string()).into());
    }

    info!(
        hosts = result.detail.len(),
        updated_at = %result.updated_at,
        "Pushed probe result received"
    );
    let outcome = state.publish_result.execute(&result).await;
    Ok(Json(outcome.into()))
}

#[instrument(skip(state), name = "api_get_results")]
pub async fn get_results(
    State(state): State<AppState>,
) -> Result<Json<ProbeCycleResult>, ApiError> {
    let store = state
        .result_store
        .as_ref()
        .ok_or_else(|| DomainError::NotFound("result store".to_string()))?;

    match store.load().await? {
        Some(result) => {
            debug!(hosts = result.detail.len(), "Serving stored probe result");
            Ok(Json(result))
        }
        None => Err(DomainError::NotFound("no probe result yet".to_string()).into()),
    }
}
