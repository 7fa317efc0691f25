//! Waitlist Entry Model
//!
//! One customer party's place in a restaurant's queue.
//!
//! # Status machine
//!
//! ```text
//! (join, local)    -> waiting
//! (join, remote)   -> remote_pending
//! waiting          -> notified | ready_to_seat | cancelled
//! notified         -> seated | cancelled
//! remote_pending   -> remote_confirmed | waiting | cancelled
//! remote_confirmed -> waiting | cancelled
//! ready_to_seat    -> seated | cancelled
//! seated, cancelled: terminal
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Waitlist entry status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WaitlistStatus {
    #[default]
    Waiting,
    Notified,
    RemotePending,
    RemoteConfirmed,
    ReadyToSeat,
    Seated,
    Cancelled,
}

impl WaitlistStatus {
    /// Statuses that hold a queue position
    pub const ACTIVE: [WaitlistStatus; 5] = [
        WaitlistStatus::Waiting,
        WaitlistStatus::Notified,
        WaitlistStatus::RemotePending,
        WaitlistStatus::RemoteConfirmed,
        WaitlistStatus::ReadyToSeat,
    ];

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WaitlistStatus::Seated | WaitlistStatus::Cancelled)
    }

    /// Remote party that has not arrived yet
    pub fn is_remote_pre_arrival(&self) -> bool {
        matches!(
            self,
            WaitlistStatus::RemotePending | WaitlistStatus::RemoteConfirmed
        )
    }

    /// Whether the status table allows `self -> next`
    pub fn can_transition_to(&self, next: WaitlistStatus) -> bool {
        use WaitlistStatus::*;
        if self.is_terminal() {
            return false;
        }
        // any active -> cancelled
        if next == Cancelled {
            return true;
        }
        matches!(
            (self, next),
            (Waiting, Notified)
                | (Waiting, ReadyToSeat)
                | (Notified, Seated)
                | (RemotePending, RemoteConfirmed)
                | (RemotePending, Waiting)
                | (RemoteConfirmed, Waiting)
                | (ReadyToSeat, Seated)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WaitlistStatus::Waiting => "waiting",
            WaitlistStatus::Notified => "notified",
            WaitlistStatus::RemotePending => "remote_pending",
            WaitlistStatus::RemoteConfirmed => "remote_confirmed",
            WaitlistStatus::ReadyToSeat => "ready_to_seat",
            WaitlistStatus::Seated => "seated",
            WaitlistStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for WaitlistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Waitlist entry entity (排队记录)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaitlistEntry {
    pub id: String,
    pub restaurant_id: String,

    // === Party ===
    pub customer_name: String,
    pub party_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub dietary_requirements: Vec<String>,

    // === Queue ===
    pub status: WaitlistStatus,
    /// 1-based rank among active entries; frozen once the entry leaves the active set
    pub queue_position: u32,
    /// Minutes
    pub estimated_wait_time: u32,
    /// Suggested (while active) or assigned (once seated) table type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_type_id: Option<String>,

    // === Remote check-in ===
    /// Set only by the remote creation path
    pub is_remote: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_arrival_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrived_at: Option<i64>,

    // === Timestamps (Unix millis) ===
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notified_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seated_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,
    /// Staff marked the table free again
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_released_at: Option<i64>,

    /// Optimistic concurrency counter, bumped by every store update
    #[serde(default)]
    pub version: u64,
}

impl WaitlistEntry {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Party details supplied by a join request
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartyInfo {
    pub customer_name: String,
    pub party_size: u32,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub dietary_requirements: Vec<String>,
}

impl PartyInfo {
    pub fn has_contact(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.phone_number) || filled(&self.email)
    }
}

/// Remote join payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RemoteJoinRequest {
    #[serde(flatten)]
    pub party: PartyInfo,
    /// Unix millis; may be supplied later via confirmation
    pub expected_arrival_time: Option<i64>,
}

/// Partial update of a waitlist entry
///
/// `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntryPatch {
    pub status: Option<WaitlistStatus>,
    pub queue_position: Option<u32>,
    pub estimated_wait_time: Option<u32>,
    pub table_type_id: Option<String>,
    pub expected_arrival_time: Option<i64>,
    pub arrived_at: Option<i64>,
    pub notified_at: Option<i64>,
    pub seated_at: Option<i64>,
    pub cancelled_at: Option<i64>,
    pub table_released_at: Option<i64>,
}

impl EntryPatch {
    pub fn status(status: WaitlistStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn position(queue_position: u32) -> Self {
        Self {
            queue_position: Some(queue_position),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch in place and bump the version
    pub fn apply(&self, entry: &mut WaitlistEntry) {
        if let Some(status) = self.status {
            entry.status = status;
        }
        if let Some(pos) = self.queue_position {
            entry.queue_position = pos;
        }
        if let Some(wait) = self.estimated_wait_time {
            entry.estimated_wait_time = wait;
        }
        if let Some(table_type_id) = &self.table_type_id {
            entry.table_type_id = Some(table_type_id.clone());
        }
        if let Some(t) = self.expected_arrival_time {
            entry.expected_arrival_time = Some(t);
        }
        if let Some(t) = self.arrived_at {
            entry.arrived_at = Some(t);
        }
        if let Some(t) = self.notified_at {
            entry.notified_at = Some(t);
        }
        if let Some(t) = self.seated_at {
            entry.seated_at = Some(t);
        }
        if let Some(t) = self.cancelled_at {
            entry.cancelled_at = Some(t);
        }
        if let Some(t) = self.table_released_at {
            entry.table_released_at = Some(t);
        }
        entry.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WaitlistStatus::*;

    #[test]
    fn test_active_subset() {
        for s in WaitlistStatus::ACTIVE {
            assert!(s.is_active(), "{} should be active", s);
        }
        assert!(Seated.is_terminal());
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn test_transition_table() {
        assert!(Waiting.can_transition_to(Notified));
        assert!(Waiting.can_transition_to(ReadyToSeat));
        assert!(Notified.can_transition_to(Seated));
        assert!(RemotePending.can_transition_to(RemoteConfirmed));
        assert!(RemotePending.can_transition_to(Waiting));
        assert!(RemoteConfirmed.can_transition_to(Waiting));
        assert!(ReadyToSeat.can_transition_to(Seated));

        assert!(!Waiting.can_transition_to(Seated));
        assert!(!Notified.can_transition_to(Waiting));
        assert!(!RemoteConfirmed.can_transition_to(RemotePending));
        assert!(!Waiting.can_transition_to(Waiting));
    }

    #[test]
    fn test_any_active_can_cancel() {
        for s in WaitlistStatus::ACTIVE {
            assert!(s.can_transition_to(Cancelled));
        }
    }

    #[test]
    fn test_terminal_is_final() {
        for next in [Waiting, Notified, Seated, Cancelled, ReadyToSeat] {
            assert!(!Seated.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&RemoteConfirmed).unwrap(),
            "\"remote_confirmed\""
        );
        let parsed: WaitlistStatus = serde_json::from_str("\"ready_to_seat\"").unwrap();
        assert_eq!(parsed, ReadyToSeat);
    }

    #[test]
    fn test_has_contact() {
        let mut party = PartyInfo {
            customer_name: "Ana".to_string(),
            party_size: 2,
            ..Default::default()
        };
        assert!(!party.has_contact());
        party.email = Some("  ".to_string());
        assert!(!party.has_contact());
        party.phone_number = Some("+34600000000".to_string());
        assert!(party.has_contact());
    }

    #[test]
    fn test_patch_apply_bumps_version() {
        let mut entry = WaitlistEntry {
            id: "e-1".to_string(),
            restaurant_id: "r-1".to_string(),
            customer_name: "Ana".to_string(),
            party_size: 2,
            phone_number: None,
            email: None,
            notes: None,
            dietary_requirements: vec![],
            status: Waiting,
            queue_position: 3,
            estimated_wait_time: 15,
            table_type_id: None,
            is_remote: false,
            confirmation_code: None,
            expected_arrival_time: None,
            arrived_at: None,
            created_at: 0,
            notified_at: None,
            seated_at: None,
            cancelled_at: None,
            table_released_at: None,
            version: 4,
        };

        let patch = EntryPatch {
            status: Some(Notified),
            notified_at: Some(1_000),
            ..Default::default()
        };
        patch.apply(&mut entry);

        assert_eq!(entry.status, Notified);
        assert_eq!(entry.notified_at, Some(1_000));
        assert_eq!(entry.queue_position, 3);
        assert_eq!(entry.version, 5);
        assert!(EntryPatch::default().is_empty());
        assert!(!patch.is_empty());
    }
}
