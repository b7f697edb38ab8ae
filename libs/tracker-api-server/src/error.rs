use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use tracker_api::StoreError;

/// Ошибка обработки запроса. Все ошибки request-scoped и отдаются
/// клиенту как `{"detail": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Невалидное тело запроса; `field` всегда попадает в текст.
    #[error("{field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account locked: too many failed attempts")]
    AccountLocked,

    #[error("Interest must be one of: {0}")]
    UnsupportedInterest(String),

    #[error("upstream: {0}")]
    Upstream(String),

    #[error("{0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        ApiError::Validation { field, reason: reason.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::AccountLocked => StatusCode::TOO_MANY_REQUESTS,
            ApiError::UnsupportedInterest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Store(StoreError::EmptyAction) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(StoreError::Full(_)) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_detail_names_the_field() {
        let err = ApiError::validation("action", "field required");
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "action: field required");
    }

    #[test]
    fn store_errors_map_to_statuses() {
        assert_eq!(ApiError::from(StoreError::EmptyAction).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ApiError::from(StoreError::Full(10)).status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn collaborator_errors_map_to_statuses() {
        assert_eq!(ApiError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::AccountLocked.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::UnsupportedInterest("a, b".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Upstream("down".into()).status(), StatusCode::BAD_GATEWAY);
    }
}
