//! Restaurant Model
//!
//! The restaurant record is owned by the surrounding system. The engine reads it
//! and only writes back the cached `current_wait_status` / `custom_wait_time` pair.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse wait status shown to walk-in customers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WaitStatus {
    #[default]
    Available,
    Short,
    Long,
    VeryLong,
    Closed,
}

impl WaitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitStatus::Available => "available",
            WaitStatus::Short => "short",
            WaitStatus::Long => "long",
            WaitStatus::VeryLong => "very_long",
            WaitStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for WaitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restaurant entity (read-mostly)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub current_wait_status: WaitStatus,
    /// Minutes; overrides the coarse status when > 0
    #[serde(default)]
    pub custom_wait_time: u32,
    /// Enables table-aware estimation and allocation
    #[serde(default)]
    pub use_advanced_queue: bool,
    /// Fallback total seat count, kept for the restaurant record; estimates
    /// are derived from table types only
    #[serde(default)]
    pub table_capacity: u32,
    /// IANA timezone name (e.g. "Europe/Madrid"); engine default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Restaurant {
    pub fn is_closed(&self) -> bool {
        self.current_wait_status == WaitStatus::Closed
    }
}
