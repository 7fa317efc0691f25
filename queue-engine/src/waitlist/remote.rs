//! Remote Check-in Handler
//!
//! 远程排队子流程：生成确认码 → 确认预计到达时间 → 到店凭码签到 → 超时自动取消。
//!
//! Every mutation goes through the [`QueueManager`] critical section of the
//! entry's restaurant.

use serde::{Deserialize, Serialize};
use shared::util::minutes_to_millis;
use shared::{EntryPatch, RemoteJoinRequest, WaitlistEntry, WaitlistStatus};
use std::sync::Arc;

use super::confirmation::normalize_code;
use super::manager::{
    JoinKind, ManagerError, ManagerResult, QueueManager, Step, TransitionExtra, validate_party,
};
use crate::db::StoreError;

/// Lock rounds for a check-in whose code moves between restaurants
const MAX_CHECK_IN_ATTEMPTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInResult {
    pub entry: WaitlistEntry,
    /// Arrived after `expected_arrival_time + grace`; check-in still succeeds
    pub is_late: bool,
}

#[derive(Debug, Clone)]
pub struct RemoteCheckInHandler {
    manager: Arc<QueueManager>,
}

impl RemoteCheckInHandler {
    pub fn new(manager: Arc<QueueManager>) -> Self {
        Self { manager }
    }

    fn grace_millis(&self) -> i64 {
        minutes_to_millis(self.manager.settings().remote_grace_minutes)
    }

    /// Remote join → `remote_pending` with a fresh confirmation code
    pub async fn request_remote_join(
        &self,
        restaurant_id: &str,
        request: RemoteJoinRequest,
    ) -> ManagerResult<WaitlistEntry> {
        validate_party(&request.party)?;
        if !request.party.has_contact() {
            return Err(ManagerError::ContactRequired);
        }
        self.manager
            .join_with(
                restaurant_id,
                &request.party,
                JoinKind::Remote {
                    expected_arrival_time: request.expected_arrival_time,
                },
            )
            .await
    }

    /// `remote_pending → remote_confirmed`; arrival defaults to now + 30 min
    pub async fn confirm_remote(
        &self,
        entry_id: &str,
        expected_arrival_time: Option<i64>,
    ) -> ManagerResult<WaitlistEntry> {
        self.manager
            .transition(
                entry_id,
                WaitlistStatus::RemoteConfirmed,
                TransitionExtra {
                    table_type_id: None,
                    expected_arrival_time,
                },
            )
            .await
    }

    /// Party arrived and presented its code
    ///
    /// The code is resolved before locking; if it resolves to another
    /// restaurant once the lock is held, that restaurant is locked instead.
    pub async fn check_in(&self, code: &str) -> ManagerResult<CheckInResult> {
        let code = normalize_code(code);
        let code = code.as_str();
        for _ in 0..MAX_CHECK_IN_ATTEMPTS {
            let entry = self.find_by_code(code).await?;
            let restaurant_id = entry.restaurant_id.as_str();
            let checked_in = self
                .manager
                .run_locked(restaurant_id, move || self.check_in_locked(code, restaurant_id))
                .await?;
            if let Some(result) = checked_in {
                return Ok(result);
            }
            tracing::debug!(restaurant_id = %restaurant_id, "Confirmation code changed restaurant, re-locking");
        }
        Err(ManagerError::StaleWriteConflict(code.to_string()))
    }

    async fn find_by_code(&self, code: &str) -> ManagerResult<WaitlistEntry> {
        self.manager
            .store()
            .get_entry_by_confirmation_code(code)
            .await?
            .ok_or_else(|| ManagerError::ConfirmationCodeNotFound(code.to_string()))
    }

    /// `None` when the code no longer belongs to the locked restaurant
    async fn check_in_locked(
        &self,
        code: &str,
        restaurant_id: &str,
    ) -> Step<Option<CheckInResult>> {
        let now = self.manager.now();
        let entry = self.find_by_code(code).await?;
        if entry.restaurant_id != restaurant_id {
            return Ok((None, Vec::new()));
        }
        if !entry.status.is_remote_pre_arrival() {
            return Err(ManagerError::invalid_transition(
                entry.status,
                WaitlistStatus::Waiting,
                "entry is not awaiting arrival",
            ));
        }

        let is_late = entry
            .expected_arrival_time
            .is_some_and(|expected| now > expected + self.grace_millis());

        let mut patch = EntryPatch {
            arrived_at: Some(now),
            ..Default::default()
        };
        match self.manager.ready_to_seat_table(&entry, now).await? {
            Some(assignment) => {
                patch.status = Some(WaitlistStatus::ReadyToSeat);
                patch.table_type_id = Some(assignment.table_type_id);
            }
            None => patch.status = Some(WaitlistStatus::Waiting),
        }

        let updated = self
            .manager
            .store()
            .update_entry(&entry.id, patch, entry.version)
            .await?;
        tracing::info!(
            restaurant_id = %updated.restaurant_id,
            entry_id = %updated.id,
            status = %updated.status,
            position = updated.queue_position,
            is_late,
            "Remote party checked in"
        );
        Ok((
            Some(CheckInResult {
                entry: updated,
                is_late,
            }),
            Vec::new(),
        ))
    }

    /// Cancel remote parties past `expected_arrival_time + grace`; returns the count
    pub async fn expire_overdue(&self, restaurant_id: &str) -> ManagerResult<usize> {
        self.manager
            .run_locked(restaurant_id, move || self.expire_locked(restaurant_id))
            .await
    }

    async fn expire_locked(&self, restaurant_id: &str) -> Step<usize> {
        let now = self.manager.now();
        self.manager.load_restaurant(restaurant_id).await?;
        let active = self.manager.store().get_active_entries(restaurant_id).await?;

        let mut cancelled = 0;
        for entry in active.iter().filter(|e| self.is_overdue(e, now)) {
            if self.cancel_overdue(entry, now).await? {
                cancelled += 1;
            }
        }

        if cancelled > 0 {
            tracing::info!(restaurant_id = %restaurant_id, cancelled, "Expired overdue remote entries");
            self.manager.settle(restaurant_id).await?;
        }
        Ok((cancelled, Vec::new()))
    }

    fn is_overdue(&self, entry: &WaitlistEntry, now: i64) -> bool {
        entry.status.is_remote_pre_arrival()
            && entry
                .expected_arrival_time
                .is_some_and(|expected| expected + self.grace_millis() < now)
    }

    /// Cancel one entry; a conflicting write re-checks it once
    async fn cancel_overdue(&self, entry: &WaitlistEntry, now: i64) -> ManagerResult<bool> {
        let patch = EntryPatch {
            status: Some(WaitlistStatus::Cancelled),
            cancelled_at: Some(now),
            ..Default::default()
        };
        let store = self.manager.store();
        match store.update_entry(&entry.id, patch.clone(), entry.version).await {
            Ok(_) => Ok(true),
            Err(StoreError::VersionConflict { .. }) => {
                let Some(fresh) = store.get_entry(&entry.id).await? else {
                    return Ok(false);
                };
                if !self.is_overdue(&fresh, now) {
                    return Ok(false);
                }
                match store.update_entry(&fresh.id, patch, fresh.version).await {
                    Ok(_) => Ok(true),
                    Err(StoreError::VersionConflict { id, .. }) => {
                        Err(ManagerError::StaleWriteConflict(id))
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Sweep every known restaurant; failures are logged per restaurant
    pub async fn expire_all(&self) -> usize {
        let ids = match self.manager.store().list_restaurant_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list restaurants for expiry");
                return 0;
            }
        };

        let mut total = 0;
        for id in ids {
            match self.expire_overdue(&id).await {
                Ok(n) => total += n,
                Err(e) => tracing::warn!(restaurant_id = %id, error = %e, "Expiry sweep failed"),
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, WaitlistStore};
    use crate::utils::ManualClock;
    use crate::waitlist::manager::QueueSettings;
    use crate::waitlist::test_support::{restaurant, table_type};
    use shared::PartyInfo;

    const START: i64 = 1_780_000_000_000;

    fn setup(advanced: bool) -> (RemoteCheckInHandler, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        store.upsert_restaurant(restaurant(advanced));
        store.upsert_table_type(table_type("t4", 4, 1, 60));
        let clock = Arc::new(ManualClock::new(START));
        let manager = Arc::new(QueueManager::new(
            store.clone(),
            clock.clone(),
            QueueSettings::default(),
        ));
        (RemoteCheckInHandler::new(manager), store, clock)
    }

    fn request(name: &str, phone: Option<&str>, expected: Option<i64>) -> RemoteJoinRequest {
        RemoteJoinRequest {
            party: PartyInfo {
                customer_name: name.to_string(),
                party_size: 2,
                phone_number: phone.map(str::to_string),
                ..Default::default()
            },
            expected_arrival_time: expected,
        }
    }

    #[tokio::test]
    async fn test_remote_join_requires_contact() {
        let (handler, _, _) = setup(false);
        let err = handler
            .request_remote_join("r-1", request("Ana", None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ManagerError::ContactRequired));
    }

    #[tokio::test]
    async fn test_remote_join_sets_remote_fields() {
        let (handler, _, _) = setup(false);
        let entry = handler
            .request_remote_join("r-1", request("Ana", Some("+34600000000"), None))
            .await
            .unwrap();
        assert_eq!(entry.status, WaitlistStatus::RemotePending);
        assert!(entry.is_remote);
        assert_eq!(entry.confirmation_code.as_ref().map(String::len), Some(6));
        assert_eq!(entry.expected_arrival_time, None);
    }

    #[tokio::test]
    async fn test_confirm_defaults_arrival() {
        let (handler, _, _) = setup(false);
        let entry = handler
            .request_remote_join("r-1", request("Ana", Some("600"), None))
            .await
            .unwrap();
        let confirmed = handler.confirm_remote(&entry.id, None).await.unwrap();
        assert_eq!(confirmed.status, WaitlistStatus::RemoteConfirmed);
        assert_eq!(confirmed.expected_arrival_time, Some(START + minutes_to_millis(30)));
    }

    #[tokio::test]
    async fn test_check_in_accepts_lowercase_code() {
        let (handler, _, _) = setup(false);
        let entry = handler
            .request_remote_join("r-1", request("Ana", Some("600"), Some(START)))
            .await
            .unwrap();
        let code = entry.confirmation_code.unwrap().to_lowercase();
        let result = handler.check_in(&format!(" {} ", code)).await.unwrap();
        assert_eq!(result.entry.status, WaitlistStatus::Waiting);
        assert_eq!(result.entry.arrived_at, Some(START));
        assert!(!result.is_late);
    }

    #[tokio::test]
    async fn test_check_in_twice_is_rejected() {
        let (handler, _, _) = setup(false);
        let entry = handler
            .request_remote_join("r-1", request("Ana", Some("600"), None))
            .await
            .unwrap();
        let code = entry.confirmation_code.unwrap();
        handler.check_in(&code).await.unwrap();
        let err = handler.check_in(&code).await.unwrap_err();
        assert!(matches!(err, ManagerError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_check_in_under_wrong_restaurant_lock_is_a_no_op() {
        let (handler, store, _) = setup(false);
        let entry = handler
            .request_remote_join("r-1", request("Ana", Some("600"), None))
            .await
            .unwrap();
        let code = entry.confirmation_code.clone().unwrap();

        let (result, outbound) = handler.check_in_locked(&code, "r-2").await.unwrap();
        assert!(result.is_none());
        assert!(outbound.is_empty());
        let untouched = store.get_entry(&entry.id).await.unwrap().unwrap();
        assert_eq!(untouched, entry);

        let (result, _) = handler.check_in_locked(&code, "r-1").await.unwrap();
        assert_eq!(result.unwrap().entry.status, WaitlistStatus::Waiting);
    }

    #[tokio::test]
    async fn test_expire_only_past_grace() {
        let (handler, store, clock) = setup(false);
        let due = handler
            .request_remote_join("r-1", request("Due", Some("600"), Some(START)))
            .await
            .unwrap();
        handler
            .request_remote_join("r-1", request("Later", Some("601"), Some(START + minutes_to_millis(60))))
            .await
            .unwrap();
        handler
            .request_remote_join("r-1", request("Open", Some("602"), None))
            .await
            .unwrap();

        // exactly at the grace boundary nothing expires
        clock.advance_minutes(15);
        assert_eq!(handler.expire_overdue("r-1").await.unwrap(), 0);

        clock.advance_minutes(1);
        assert_eq!(handler.expire_overdue("r-1").await.unwrap(), 1);
        let cancelled = store.get_entry(&due.id).await.unwrap().unwrap();
        assert_eq!(cancelled.status, WaitlistStatus::Cancelled);
        assert_eq!(cancelled.cancelled_at, Some(START + minutes_to_millis(16)));

        let positions: Vec<u32> = store
            .get_active_entries("r-1")
            .await
            .unwrap()
            .iter()
            .map(|e| e.queue_position)
            .collect();
        assert_eq!(positions, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_expire_all_sweeps_each_restaurant() {
        let (handler, store, clock) = setup(false);
        let mut other = restaurant(false);
        other.id = "r-2".to_string();
        store.upsert_restaurant(other);

        for rid in ["r-1", "r-2"] {
            handler
                .request_remote_join(rid, request("Ana", Some("600"), Some(START)))
                .await
                .unwrap();
        }
        clock.advance_minutes(20);
        assert_eq!(handler.expire_all().await, 2);
        assert_eq!(handler.expire_all().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_restaurant_expiry() {
        let (handler, _, _) = setup(false);
        let err = handler.expire_overdue("nope").await.unwrap_err();
        assert!(matches!(err, ManagerError::RestaurantNotFound(_)));
    }
}
