//! Shared types for the waitlist engine
//!
//! Data models (waitlist entries, table types, restaurants) and the unified
//! error system used by the engine and by any transport layer in front of it.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use models::{
    EntryPatch, PartyInfo, RemoteJoinRequest, Restaurant, TableType, WaitStatus, WaitlistEntry,
    WaitlistStatus,
};
