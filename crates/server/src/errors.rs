use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{debug, error};

use models::BlogId;

/// A store outcome on its way out as an HTTP response.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub ServiceError);

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self(ServiceError::Validation(msg.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = self.0.to_string();
        if status.is_server_error() {
            error!(error = %msg, code = self.0.code(), "request failed");
        } else {
            debug!(error = %msg, code = self.0.code(), "request rejected");
        }
        (status, Json(serde_json::json!({"error": msg, "code": self.0.code()}))).into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

/// Decode a JSON request body. Content type is not checked.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::validation(format!("invalid request payload: {e}")))
}

pub fn parse_blog_id(raw: &str) -> Result<BlogId, ApiError> {
    raw.parse::<BlogId>()
        .map_err(|_| ApiError::validation(format!("invalid blog id: {raw}")))
}
