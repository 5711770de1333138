use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tracing::warn;

pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if is_read_only_method(request.method()) {
        return Ok(next.run(request).await);
    }
    let Some(expected) = state.auth.secret.as_deref() else {
        warn!(path = %request.uri().path(), "Rejected control request, no secret configured");
        return Err(StatusCode::UNAUTHORIZED);
    };
    let provided = request
        .headers()
        .get(&*state.auth.header_name)
        .and_then(|v| v.to_str().ok());
    match provided {
        Some(provided) if secrets_match(provided.as_bytes(), expected.as_bytes()) => {
            Ok(next.run(request).await)
        }
        _ => {
            warn!(path = %request.uri().path(), "Rejected control request without a valid secret");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

pub fn is_read_only_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

pub fn secrets_match(provided: &[u8], expected: &[u8]) -> bool {
    provided.len() == expected.len() && bool::from(provided.ct_eq(expected))
}
