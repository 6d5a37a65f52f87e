use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::address::StoreError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// JSON error body: `{"detail": <title>, "reason": <reason?>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub reason: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, reason: Option<String>) -> Self {
        Self { status, title, reason }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = match self.reason {
            Some(reason) => serde_json::json!({"detail": self.title, "reason": reason}),
            None => serde_json::json!({"detail": self.title}),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(_) => {
                JsonApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "Validation Error", Some(e.to_string()))
            }
            ServiceError::NotFound(_) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", None),
            ServiceError::Conflict(_) => JsonApiError::new(StatusCode::CONFLICT, "Conflict", None),
            ServiceError::Store(_) => {
                error!(err = %e, "address store call failed");
                JsonApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable", None)
            }
            ServiceError::CorruptRecord { .. } | ServiceError::Serialization(_) => {
                error!(err = %e, "address record unusable");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        }
    }
}

impl From<models::ModelError> for JsonApiError {
    fn from(e: models::ModelError) -> Self {
        ServiceError::from(e).into()
    }
}

/// Body syntax (400), content type (415) and shape (422) failures keep axum's status.
impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        JsonApiError::new(rejection.status(), "Validation Error", Some(rejection.body_text()))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("address store unreachable: {0}")]
    StoreUnavailable(#[from] StoreError),
}
