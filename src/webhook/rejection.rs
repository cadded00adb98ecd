//! Terminal request failures and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Why a webhook request was refused.
///
/// `Display` gives the reason logged by the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("invalid remote address")]
    InvalidRemoteAddr,

    #[error("source not allowed")]
    SourceNotAllowed,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("request body too large")]
    BodyTooLarge,

    #[error("failed to read body")]
    BodyRead,
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::InvalidRemoteAddr | Rejection::SourceNotAllowed => StatusCode::FORBIDDEN,
            Rejection::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Rejection::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Rejection::BodyRead => StatusCode::BAD_REQUEST,
        }
    }

    /// Response body sent to the caller.
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::InvalidRemoteAddr | Rejection::SourceNotAllowed => "Forbidden",
            Rejection::MethodNotAllowed => "Only POST allowed",
            Rejection::BodyTooLarge => "Request body too large",
            Rejection::BodyRead => "Failed to read body",
        }
    }

    /// Metrics label.
    pub fn outcome(&self) -> &'static str {
        match self {
            Rejection::InvalidRemoteAddr => "invalid_remote_addr",
            Rejection::SourceNotAllowed => "source_not_allowed",
            Rejection::MethodNotAllowed => "method_not_allowed",
            Rejection::BodyTooLarge => "body_too_large",
            Rejection::BodyRead => "body_read_error",
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status(), self.message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Rejection::InvalidRemoteAddr.status(), StatusCode::FORBIDDEN);
        assert_eq!(Rejection::SourceNotAllowed.status(), StatusCode::FORBIDDEN);
        assert_eq!(Rejection::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(Rejection::BodyTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(Rejection::BodyRead.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_into_response() {
        let response = Rejection::BodyTooLarge.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
