use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Every way a validation request can fail. The display text is the message
/// shown to the end user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No license key provided. Please contact your tax professional.")]
    MissingKey,
    #[error("Unable to validate license. Please try again later.")]
    FetchFailed,
    #[error("License key not found. Please contact your tax professional.")]
    NotFound,
    #[error("This license is no longer active. Please contact your tax professional.")]
    Inactive,
    #[error("This license has expired. Please contact your tax professional.")]
    Expired,
    #[error("This license is not valid for this domain.")]
    DomainMismatch,
    #[error("An error occurred during validation. Please try again.")]
    Internal,
}

impl ValidationError {
    /// Machine-readable code placed in the `error` field.
    pub fn code(self) -> &'static str {
        match self {
            ValidationError::MissingKey => "MISSING_KEY",
            ValidationError::FetchFailed => "LICENSE_FETCH_ERROR",
            ValidationError::NotFound => "INVALID_LICENSE",
            ValidationError::Inactive => "LICENSE_INACTIVE",
            ValidationError::Expired => "LICENSE_EXPIRED",
            ValidationError::DomainMismatch => "DOMAIN_MISMATCH",
            ValidationError::Internal => "SERVER_ERROR",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ValidationError::MissingKey => StatusCode::BAD_REQUEST,
            ValidationError::NotFound
            | ValidationError::Inactive
            | ValidationError::Expired
            | ValidationError::DomainMismatch => StatusCode::UNAUTHORIZED,
            ValidationError::FetchFailed | ValidationError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn body(self) -> Value {
        json!({
            "valid": false,
            "error": self.code(),
            "message": self.to_string(),
        })
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(ValidationError::MissingKey.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ValidationError::DomainMismatch.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ValidationError::FetchFailed.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn body_shape() {
        assert_eq!(
            ValidationError::Expired.body(),
            json!({
                "valid": false,
                "error": "LICENSE_EXPIRED",
                "message": "This license has expired. Please contact your tax professional."
            })
        );
    }
}
