//! Unified error system for the waitlist engine
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - HTTP status mapping for whatever transport sits in front
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Waitlist / restaurant errors
//! - 7xxx: Table errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::EntryNotFound);
//! assert_eq!(err.http_status().as_u16(), 404);
//!
//! let err = AppError::validation("party_size must be at least 1")
//!     .with_detail("field", "party_size");
//! assert_eq!(err.code.code(), 2);
//! ```

mod codes;
mod http;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
