use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::error_response;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid parameter: {field} - {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
}

impl ApiError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "rejected request");
        error_response(StatusCode::BAD_REQUEST, &self.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
