use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::domain::DomainError;

/// Body of every validator rejection.
pub const FORBIDDEN_MESSAGE: &str = "Forbidden: Invalid origin";

/// A [`DomainError`] rendered as a plain-text HTTP response.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn forbidden() -> Self {
        Self(DomainError::validation(FORBIDDEN_MESSAGE))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::ValidationError(_) => StatusCode::FORBIDDEN,
            DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DomainError::ConfigurationError(_)
            | DomainError::ProviderError(_)
            | DomainError::StreamingError(_)
            | DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain")],
            self.0.message().to_string(),
        )
            .into_response()
    }
}
