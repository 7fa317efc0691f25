//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::EntryNotFound
            | Self::ConfirmationCodeNotFound
            | Self::RestaurantNotFound
            | Self::TableTypeNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::InvalidTransition
            | Self::NoTableAvailable
            | Self::StaleWriteConflict => StatusCode::CONFLICT,

            // 422 Business rule
            Self::RestaurantClosed => StatusCode::UNPROCESSABLE_ENTITY,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::SystemBusy | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation errors)
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::ContactRequired => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_family() {
        assert_eq!(ErrorCode::EntryNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::ConfirmationCodeNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_conflict_family() {
        assert_eq!(
            ErrorCode::InvalidTransition.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::StaleWriteConflict.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_busy_is_retryable_status() {
        assert_eq!(
            ErrorCode::SystemBusy.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
