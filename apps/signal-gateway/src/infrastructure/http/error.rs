//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::ports::SignalError;

/// Errors returned by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Backend call failed, timed out, or a stream could not be opened.
    #[error(transparent)]
    Backend(#[from] SignalError),

    /// Request body could not be decoded.
    #[error("Invalid request body")]
    InvalidBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidBody => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::SignalOperation;

    #[test]
    fn backend_error_is_internal_with_error_text() {
        let err = ApiError::from(SignalError::Unavailable {
            operation: SignalOperation::GetFuelLevel,
            message: "connection refused".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "error getting fuel level: backend unavailable: connection refused"
        );
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_body_is_bad_request() {
        let response = ApiError::InvalidBody.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
