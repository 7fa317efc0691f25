//! Unified error codes for the waitlist engine
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Waitlist / restaurant errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Waitlist ====================
    /// Waitlist entry not found
    EntryNotFound = 4001,
    /// Status change not allowed from the entry's current status
    InvalidTransition = 4002,
    /// No active remote entry carries this confirmation code
    ConfirmationCodeNotFound = 4003,
    /// Remote entries need a phone number or an email
    ContactRequired = 4004,
    /// Restaurant not found
    RestaurantNotFound = 4101,
    /// Restaurant is closed and not accepting joins
    RestaurantClosed = 4102,

    // ==================== 7xxx: Table ====================
    /// Table type not found
    TableTypeNotFound = 7001,
    /// Every table of the requested type is occupied
    NoTableAvailable = 7002,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,
    TimeoutError = 9004,
    ConfigError = 9005,

    // ==================== 94xx: Storage ====================
    /// Concurrent write lost the optimistic version check twice
    StaleWriteConflict = 9401,
    SystemBusy = 9404,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Whether the caller may retry the same request unchanged
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorCode::StaleWriteConflict | ErrorCode::SystemBusy | ErrorCode::TimeoutError
        )
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Waitlist
            ErrorCode::EntryNotFound => "Waitlist entry not found",
            ErrorCode::InvalidTransition => "Status transition is not allowed",
            ErrorCode::ConfirmationCodeNotFound => "Confirmation code not found",
            ErrorCode::ContactRequired => "A phone number or email is required",
            ErrorCode::RestaurantNotFound => "Restaurant not found",
            ErrorCode::RestaurantClosed => "Restaurant is closed",

            // Table
            ErrorCode::TableTypeNotFound => "Table type not found",
            ErrorCode::NoTableAvailable => "No table of this type is available",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",

            // Storage
            ErrorCode::StaleWriteConflict => "Concurrent update conflict, please retry",
            ErrorCode::SystemBusy => "System busy, please retry later",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Waitlist
            4001 => Ok(ErrorCode::EntryNotFound),
            4002 => Ok(ErrorCode::InvalidTransition),
            4003 => Ok(ErrorCode::ConfirmationCodeNotFound),
            4004 => Ok(ErrorCode::ContactRequired),
            4101 => Ok(ErrorCode::RestaurantNotFound),
            4102 => Ok(ErrorCode::RestaurantClosed),

            // Table
            7001 => Ok(ErrorCode::TableTypeNotFound),
            7002 => Ok(ErrorCode::NoTableAvailable),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9401 => Ok(ErrorCode::StaleWriteConflict),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
