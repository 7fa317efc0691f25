use crate::db::StoreError;
use shared::error::{AppError, ErrorCode};
use shared::WaitlistStatus;
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Restaurant not found: {0}")]
    RestaurantNotFound(String),

    #[error("Waitlist entry not found: {0}")]
    EntryNotFound(String),

    #[error("Confirmation code not found: {0}")]
    ConfirmationCodeNotFound(String),

    #[error("Table type not found: {0}")]
    TableTypeNotFound(String),

    #[error("Cannot move entry from {from} to {to}: {reason}")]
    InvalidTransition {
        from: WaitlistStatus,
        to: WaitlistStatus,
        reason: &'static str,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Remote entries need a phone number or email")]
    ContactRequired,

    #[error("Restaurant is closed: {0}")]
    RestaurantClosed(String),

    #[error("No free table of type {0}")]
    NoTableAvailable(String),

    #[error("Entry {0} was modified concurrently")]
    StaleWriteConflict(String),

    #[error("Timed out waiting for restaurant {0}")]
    LockTimeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ManagerError {
    pub(crate) fn invalid_transition(
        from: WaitlistStatus,
        to: WaitlistStatus,
        reason: &'static str,
    ) -> Self {
        ManagerError::InvalidTransition { from, to, reason }
    }

    /// Version conflict reported by the store
    pub(crate) fn is_version_conflict(&self) -> bool {
        matches!(self, ManagerError::Store(StoreError::VersionConflict { .. }))
    }
}

/// 存储错误 → 错误码
fn classify_store_error(e: &StoreError) -> ErrorCode {
    match e {
        StoreError::NotFound(_) => ErrorCode::NotFound,
        StoreError::Duplicate(_) | StoreError::DuplicateConfirmationCode(_) => {
            ErrorCode::AlreadyExists
        }
        StoreError::VersionConflict { .. } => ErrorCode::StaleWriteConflict,
        StoreError::Database(_) => ErrorCode::DatabaseError,
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Store(e) => {
                let code = classify_store_error(&e);
                tracing::error!(error = %e, error_code = %code, "Store error occurred");
                AppError::with_message(code, e.to_string())
            }
            ManagerError::RestaurantNotFound(id) => {
                AppError::with_message(ErrorCode::RestaurantNotFound, format!("Restaurant not found: {}", id))
                    .with_detail("restaurant_id", id)
            }
            ManagerError::EntryNotFound(id) => {
                AppError::with_message(ErrorCode::EntryNotFound, format!("Waitlist entry not found: {}", id))
                    .with_detail("entry_id", id)
            }
            ManagerError::ConfirmationCodeNotFound(code) => AppError::with_message(
                ErrorCode::ConfirmationCodeNotFound,
                format!("Confirmation code not found: {}", code),
            ),
            ManagerError::TableTypeNotFound(id) => {
                AppError::with_message(ErrorCode::TableTypeNotFound, format!("Table type not found: {}", id))
                    .with_detail("table_type_id", id)
            }
            ManagerError::InvalidTransition { from, to, reason } => {
                AppError::invalid_transition(from.as_str(), to.as_str()).with_detail("reason", reason)
            }
            ManagerError::Validation(msg) => AppError::validation(msg),
            ManagerError::ContactRequired => AppError::new(ErrorCode::ContactRequired),
            ManagerError::RestaurantClosed(id) => AppError::new(ErrorCode::RestaurantClosed)
                .with_detail("restaurant_id", id),
            ManagerError::NoTableAvailable(id) => AppError::new(ErrorCode::NoTableAvailable)
                .with_detail("table_type_id", id),
            ManagerError::StaleWriteConflict(id) => AppError::new(ErrorCode::StaleWriteConflict)
                .with_detail("entry_id", id),
            ManagerError::LockTimeout(id) => {
                AppError::busy(format!("Restaurant {} is busy, retry shortly", id))
                    .with_detail("restaurant_id", id)
            }
            ManagerError::Internal(msg) => AppError::internal(msg),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
