/// Error types for posts-service
///
/// Every failure a handler can surface is one of these variants; no operation
/// returns a partially populated success value on error. Validation variants
/// are raised before any I/O, dependency variants name the failing sibling
/// service, and anything unclassified wraps its cause as `Internal`.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for posts-service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("limit must be in the range [1;100]")]
    LimitOutOfRange,

    #[error("content is empty")]
    EmptyContent,

    #[error("invalid attachments")]
    InvalidAttachments,

    #[error("invalid metadata")]
    InvalidMetadata,

    #[error("post not found")]
    PostNotFound,

    #[error("invalid access token")]
    InvalidAccessToken,

    #[error("unknown subject")]
    UnknownSubject,

    #[error("service storage unavailable")]
    StorageUnavailable,

    #[error("service users unavailable")]
    UsersUnavailable,

    #[error("service linkedacc unavailable")]
    LinkedAccUnavailable,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::LimitOutOfRange
            | ServiceError::EmptyContent
            | ServiceError::InvalidAttachments
            | ServiceError::InvalidMetadata => StatusCode::BAD_REQUEST,
            ServiceError::PostNotFound => StatusCode::NOT_FOUND,
            ServiceError::InvalidAccessToken | ServiceError::UnknownSubject => {
                StatusCode::UNAUTHORIZED
            }
            ServiceError::StorageUnavailable
            | ServiceError::UsersUnavailable
            | ServiceError::LinkedAccUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        assert_eq!(ServiceError::LimitOutOfRange.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::EmptyContent.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::InvalidAttachments.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::InvalidMetadata.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn auth_errors_map_to_unauthorized() {
        assert_eq!(ServiceError::InvalidAccessToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::UnknownSubject.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn dependency_errors_map_to_service_unavailable() {
        assert_eq!(
            ServiceError::StorageUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServiceError::UsersUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServiceError::LinkedAccUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn not_found_and_internal_mapping() {
        assert_eq!(ServiceError::PostNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_carries_its_cause() {
        let err: ServiceError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ServiceError::Internal(_)));
        assert!(err.to_string().contains("internal error"));
    }
}
