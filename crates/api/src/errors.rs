use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use steer_dns_domain::DomainError;

pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            DomainError::NotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),

            DomainError::InvalidDomainName(_)
            | DomainError::InvalidIpAddress(_)
            | DomainError::SerializationError(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),

            DomainError::ConfigError(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.0.to_string()),

            DomainError::CycleInProgress => (StatusCode::CONFLICT, self.0.to_string()),

            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
