//! QueueManager - 排队核心
//!
//! Owns the waitlist-entry lifecycle and the queue-position invariant of every
//! restaurant:
//!
//! ```text
//! join / transition / release_table
//!     ├─ 1. acquire the restaurant's lock (bounded wait)
//!     ├─ 2. read fresh state from the store
//!     ├─ 3. validate, write, renumber, re-derive coarse status
//!     ├─ 4. version conflict on the primary write → run the whole step once more
//!     ├─ 5. drop the lock
//!     └─ 6. dispatch notifications / analytics on spawned tasks
//! ```
//!
//! Active positions of a restaurant are always exactly `1..=N`.

mod error;

pub use error::{ManagerError, ManagerResult};

use chrono_tz::Tz;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared::util::minutes_to_millis;
use shared::{
    EntryPatch, PartyInfo, Restaurant, TableType, WaitStatus, WaitlistEntry, WaitlistStatus,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::allocator::{self, AllocationStrategy};
use super::availability::{OCCUPANCY_LOOKBACK_MILLIS, TableAvailability};
use super::confirmation;
use super::estimator::{self, HistoricalContext};
use super::locks::RestaurantLocks;
use super::outbound::{Outbound, OutboundDispatcher};
use super::signals::HistoricalSignals;
use crate::core::Config;
use crate::db::{StoreError, WaitlistStore};
use crate::services::{
    HistoricalSignalSource, LogNotifier, NoHistory, Notification, NotificationSender,
    SeatingAnalytics, SeatingRecord,
};
use crate::utils::time::{local_hour_weekday, restaurant_tz};
use crate::utils::Clock;

/// Active entries at or above this count mark the restaurant `long`
const LONG_WAIT_THRESHOLD: usize = 10;
/// Attempts at drawing an unused confirmation code
const MAX_CODE_ATTEMPTS: usize = 8;

/// Engine tunables derived from [`Config`]
#[derive(Debug, Clone)]
pub struct QueueSettings {
    pub strategy: AllocationStrategy,
    /// Minutes a remote party may be late before expiry
    pub remote_grace_minutes: u32,
    /// Expected arrival offset when confirmation omits one
    pub default_arrival_minutes: u32,
    pub lock_timeout: Duration,
    pub business_tz: Tz,
}

impl QueueSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            strategy: config.allocation_strategy,
            remote_grace_minutes: config.remote_grace_minutes,
            default_arrival_minutes: config.default_arrival_minutes,
            lock_timeout: config.lock_timeout(),
            business_tz: config.business_timezone,
        }
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            strategy: AllocationStrategy::default(),
            remote_grace_minutes: 15,
            default_arrival_minutes: 30,
            lock_timeout: Duration::from_millis(5000),
            business_tz: chrono_tz::Europe::Madrid,
        }
    }
}

/// Optional inputs of a status transition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionExtra {
    /// Table type actually used when seating (overrides the suggestion)
    pub table_type_id: Option<String>,
    /// Expected arrival when confirming a remote entry (Unix millis)
    pub expected_arrival_time: Option<i64>,
}

/// How an entry enters the queue
#[derive(Debug, Clone, Copy)]
pub(crate) enum JoinKind {
    Local,
    Remote { expected_arrival_time: Option<i64> },
}

/// Result of one critical-section step: value plus owed side effects
pub(crate) type Step<T> = ManagerResult<(T, Vec<Outbound>)>;

pub struct QueueManager {
    store: Arc<dyn WaitlistStore>,
    signals: RwLock<Arc<dyn HistoricalSignalSource>>,
    outbound: OutboundDispatcher,
    locks: RestaurantLocks,
    clock: Arc<dyn Clock>,
    settings: QueueSettings,
}

impl std::fmt::Debug for QueueManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueManager")
            .field("settings", &self.settings)
            .field("locks", &self.locks.len())
            .finish_non_exhaustive()
    }
}

impl QueueManager {
    /// Manager with log-only notifications and no analytics
    pub fn new(store: Arc<dyn WaitlistStore>, clock: Arc<dyn Clock>, settings: QueueSettings) -> Self {
        Self {
            store,
            signals: RwLock::new(Arc::new(NoHistory)),
            outbound: OutboundDispatcher::new(Arc::new(LogNotifier), Arc::new(NoHistory)),
            locks: RestaurantLocks::new(),
            clock,
            settings,
        }
    }

    pub fn set_notifier(&self, notifier: Arc<dyn NotificationSender>) {
        self.outbound.set_notifier(notifier);
    }

    pub fn set_analytics(&self, analytics: Arc<dyn SeatingAnalytics>) {
        self.outbound.set_analytics(analytics);
    }

    pub fn set_signal_source(&self, source: Arc<dyn HistoricalSignalSource>) {
        *self.signals.write() = source;
    }

    pub fn settings(&self) -> &QueueSettings {
        &self.settings
    }

    pub(crate) fn store(&self) -> &Arc<dyn WaitlistStore> {
        &self.store
    }

    pub(crate) fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    // ========================================================================
    // Public operations
    // ========================================================================

    /// Walk-in join → `waiting` at the back of the queue
    pub async fn join(&self, restaurant_id: &str, party: PartyInfo) -> ManagerResult<WaitlistEntry> {
        validate_party(&party)?;
        self.join_with(restaurant_id, &party, JoinKind::Local).await
    }

    /// Apply a status change from the transition table
    pub async fn transition(
        &self,
        entry_id: &str,
        next: WaitlistStatus,
        extra: TransitionExtra,
    ) -> ManagerResult<WaitlistEntry> {
        let entry = self.get_entry(entry_id).await?;
        let extra = &extra;
        self.run_locked(&entry.restaurant_id, move || {
            self.transition_locked(entry_id, next, extra)
        })
        .await
    }

    /// Mark a seated party's table free again
    pub async fn release_table(&self, entry_id: &str) -> ManagerResult<WaitlistEntry> {
        let entry = self.get_entry(entry_id).await?;
        self.run_locked(&entry.restaurant_id, move || self.release_locked(entry_id))
            .await
    }

    pub async fn get_entry(&self, entry_id: &str) -> ManagerResult<WaitlistEntry> {
        self.store
            .get_entry(entry_id)
            .await?
            .ok_or_else(|| ManagerError::EntryNotFound(entry_id.to_string()))
    }

    /// Active entries ordered by position
    pub async fn active_queue(&self, restaurant_id: &str) -> ManagerResult<Vec<WaitlistEntry>> {
        self.load_restaurant(restaurant_id).await?;
        Ok(self.store.get_active_entries(restaurant_id).await?)
    }

    // ========================================================================
    // Critical section
    // ========================================================================

    /// Run `op` under the restaurant's lock
    ///
    /// A version conflict on the first run re-runs `op` once against fresh
    /// state; a second conflict surfaces as `StaleWriteConflict`. Side effects
    /// are dispatched after the lock is released. Unknown restaurants are
    /// rejected before a lock is created for them.
    pub(crate) async fn run_locked<T, F, Fut>(&self, restaurant_id: &str, op: F) -> ManagerResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Step<T>>,
    {
        self.load_restaurant(restaurant_id).await?;
        let guard = self
            .locks
            .acquire(restaurant_id, self.settings.lock_timeout)
            .await
            .ok_or_else(|| {
                tracing::warn!(restaurant_id = %restaurant_id, "Restaurant lock timed out");
                ManagerError::LockTimeout(restaurant_id.to_string())
            })?;

        let result = match op().await {
            Err(e) if e.is_version_conflict() => {
                tracing::debug!(restaurant_id = %restaurant_id, error = %e, "Version conflict, retrying once");
                op().await
            }
            other => other,
        };
        drop(guard);

        let (value, outbound) = result.map_err(|e| match e {
            ManagerError::Store(StoreError::VersionConflict { id, .. }) => {
                tracing::warn!(restaurant_id = %restaurant_id, entry_id = %id, "Stale write after retry");
                ManagerError::StaleWriteConflict(id)
            }
            other => other,
        })?;
        self.outbound.dispatch(outbound);
        Ok(value)
    }

    pub(crate) async fn join_with(
        &self,
        restaurant_id: &str,
        party: &PartyInfo,
        kind: JoinKind,
    ) -> ManagerResult<WaitlistEntry> {
        let signals = self.fetch_signals(restaurant_id).await;
        let signals = &signals;
        self.run_locked(restaurant_id, move || {
            self.join_locked(restaurant_id, party, kind, signals)
        })
        .await
    }

    async fn join_locked(
        &self,
        restaurant_id: &str,
        party: &PartyInfo,
        kind: JoinKind,
        signals: &Option<HistoricalSignals>,
    ) -> Step<WaitlistEntry> {
        let now = self.now();
        let restaurant = self.load_restaurant(restaurant_id).await?;
        if restaurant.is_closed() {
            return Err(ManagerError::RestaurantClosed(restaurant_id.to_string()));
        }

        let active = self.store.get_active_entries(restaurant_id).await?;
        let queue_position = u32::try_from(active.len() + 1)
            .map_err(|_| ManagerError::Internal("Queue is too long".to_string()))?;
        let (_, availability) = self.snapshot(restaurant_id, now).await?;

        let context = self.history_context(signals.clone(), &restaurant, now);
        let wait = estimator::estimate(
            &restaurant,
            &active,
            &availability,
            party.party_size,
            context.as_ref(),
        );
        let suggestion = if restaurant.use_advanced_queue {
            allocator::allocate(party.party_size, availability.tables(), self.settings.strategy)
        } else {
            None
        };

        let (status, is_remote, expected_arrival_time) = match kind {
            JoinKind::Local => (WaitlistStatus::Waiting, false, None),
            JoinKind::Remote {
                expected_arrival_time,
            } => (WaitlistStatus::RemotePending, true, expected_arrival_time),
        };
        let mut entry = WaitlistEntry {
            id: uuid::Uuid::new_v4().to_string(),
            restaurant_id: restaurant_id.to_string(),
            customer_name: party.customer_name.trim().to_string(),
            party_size: party.party_size,
            phone_number: party.phone_number.clone(),
            email: party.email.clone(),
            notes: party.notes.clone(),
            dietary_requirements: party.dietary_requirements.clone(),
            status,
            queue_position,
            estimated_wait_time: wait.minutes,
            table_type_id: suggestion.as_ref().map(|a| a.table_type_id.clone()),
            is_remote,
            confirmation_code: None,
            expected_arrival_time,
            arrived_at: None,
            created_at: now,
            notified_at: None,
            seated_at: None,
            cancelled_at: None,
            table_released_at: None,
            version: 0,
        };

        let inserted = if is_remote {
            self.insert_with_code(&mut entry).await?
        } else {
            self.store.insert_entry(entry).await?
        };

        tracing::info!(
            restaurant_id = %restaurant_id,
            entry_id = %inserted.id,
            party_size = inserted.party_size,
            position = inserted.queue_position,
            wait_minutes = inserted.estimated_wait_time,
            status = %inserted.status,
            "Party joined waitlist"
        );

        self.refresh_wait_status(&restaurant, active.len() + 1).await;
        Ok((inserted, Vec::new()))
    }

    /// Insert a remote entry, drawing codes until one is unused
    async fn insert_with_code(&self, entry: &mut WaitlistEntry) -> ManagerResult<WaitlistEntry> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            entry.confirmation_code = Some(confirmation::generate_code());
            match self.store.insert_entry(entry.clone()).await {
                Ok(inserted) => return Ok(inserted),
                Err(StoreError::DuplicateConfirmationCode(code)) => {
                    tracing::debug!(code = %code, "Confirmation code collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ManagerError::Internal(
            "Could not allocate a unique confirmation code".to_string(),
        ))
    }

    async fn transition_locked(
        &self,
        entry_id: &str,
        next: WaitlistStatus,
        extra: &TransitionExtra,
    ) -> Step<WaitlistEntry> {
        let now = self.now();
        let entry = self.get_entry(entry_id).await?;
        if !entry.status.can_transition_to(next) {
            let reason = if entry.status.is_terminal() {
                "entry is already closed"
            } else {
                "transition is not allowed"
            };
            return Err(ManagerError::invalid_transition(entry.status, next, reason));
        }

        let mut outbound = Vec::new();
        let mut patch = EntryPatch::status(next);
        match next {
            WaitlistStatus::Notified => {
                patch.notified_at = Some(now);
                outbound.push(Outbound::Notify(Notification::table_ready(
                    &entry.customer_name,
                    entry.phone_number.clone(),
                )));
            }
            WaitlistStatus::Seated => {
                let table_type_id = extra
                    .table_type_id
                    .clone()
                    .or_else(|| entry.table_type_id.clone());
                if let Some(table_type_id) = &table_type_id {
                    self.ensure_table_free(&entry.restaurant_id, table_type_id, now)
                        .await?;
                }
                patch.seated_at = Some(now);
                patch.table_type_id = table_type_id.clone();
                outbound.push(Outbound::Seating(SeatingRecord {
                    restaurant_id: entry.restaurant_id.clone(),
                    table_type_id,
                    party_size: entry.party_size,
                    seated_at: now,
                    arrived_at: entry.arrived_at,
                }));
            }
            WaitlistStatus::ReadyToSeat => {
                let assignment = self.ready_to_seat_table(&entry, now).await?.ok_or_else(|| {
                    ManagerError::invalid_transition(
                        entry.status,
                        next,
                        "no free table for the head of the queue",
                    )
                })?;
                patch.table_type_id = Some(assignment.table_type_id);
            }
            WaitlistStatus::Waiting => {
                // remote party showing up
                patch.arrived_at = Some(now);
            }
            WaitlistStatus::RemoteConfirmed => {
                patch.expected_arrival_time = Some(
                    extra
                        .expected_arrival_time
                        .or(entry.expected_arrival_time)
                        .unwrap_or(now + minutes_to_millis(self.settings.default_arrival_minutes)),
                );
            }
            WaitlistStatus::Cancelled => {
                patch.cancelled_at = Some(now);
            }
            WaitlistStatus::RemotePending => {
                return Err(ManagerError::invalid_transition(
                    entry.status,
                    next,
                    "entries only start as remote_pending",
                ));
            }
        }

        let updated = self.store.update_entry(&entry.id, patch, entry.version).await?;
        tracing::info!(
            restaurant_id = %updated.restaurant_id,
            entry_id = %updated.id,
            from = %entry.status,
            to = %updated.status,
            "Waitlist entry transitioned"
        );

        if next.is_terminal() {
            self.settle(&updated.restaurant_id).await?;
        }
        Ok((updated, outbound))
    }

    async fn release_locked(&self, entry_id: &str) -> Step<WaitlistEntry> {
        let entry = self.get_entry(entry_id).await?;
        if entry.status != WaitlistStatus::Seated {
            return Err(ManagerError::invalid_transition(
                entry.status,
                WaitlistStatus::Seated,
                "only seated entries hold a table",
            ));
        }
        if entry.table_released_at.is_some() {
            return Ok((entry, Vec::new()));
        }

        let patch = EntryPatch {
            table_released_at: Some(self.now()),
            ..Default::default()
        };
        let updated = self.store.update_entry(&entry.id, patch, entry.version).await?;
        tracing::info!(
            restaurant_id = %updated.restaurant_id,
            entry_id = %updated.id,
            table_type_id = ?updated.table_type_id,
            "Table released"
        );
        Ok((updated, Vec::new()))
    }

    // ========================================================================
    // Shared helpers (also used by the remote check-in flow)
    // ========================================================================

    pub(crate) async fn load_restaurant(&self, restaurant_id: &str) -> ManagerResult<Restaurant> {
        self.store
            .get_restaurant(restaurant_id)
            .await?
            .ok_or_else(|| ManagerError::RestaurantNotFound(restaurant_id.to_string()))
    }

    /// Table types plus live availability at `now`
    pub(crate) async fn snapshot(
        &self,
        restaurant_id: &str,
        now: i64,
    ) -> ManagerResult<(Vec<TableType>, TableAvailability)> {
        let table_types = self.store.get_table_types(restaurant_id).await?;
        let seated = self
            .store
            .get_seated_entries(restaurant_id, now - OCCUPANCY_LOOKBACK_MILLIS)
            .await?;
        let availability = TableAvailability::derive(&table_types, &seated, now);
        Ok((table_types, availability))
    }

    /// Table the entry could move to `ready_to_seat` for right now
    pub(crate) async fn ready_to_seat_table(
        &self,
        entry: &WaitlistEntry,
        now: i64,
    ) -> ManagerResult<Option<allocator::TableAssignment>> {
        let restaurant = self.load_restaurant(&entry.restaurant_id).await?;
        if !restaurant.use_advanced_queue {
            return Ok(None);
        }
        let active = self.store.get_active_entries(&entry.restaurant_id).await?;
        let (_, availability) = self.snapshot(&entry.restaurant_id, now).await?;
        Ok(allocator::ready_to_seat_assignment(
            entry,
            &active,
            availability.tables(),
            self.settings.strategy,
        ))
    }

    async fn ensure_table_free(
        &self,
        restaurant_id: &str,
        table_type_id: &str,
        now: i64,
    ) -> ManagerResult<()> {
        let (table_types, availability) = self.snapshot(restaurant_id, now).await?;
        if !table_types.iter().any(|t| t.id == table_type_id) {
            return Err(ManagerError::TableTypeNotFound(table_type_id.to_string()));
        }
        match availability.get(table_type_id) {
            Some(t) if t.has_free() => Ok(()),
            _ => Err(ManagerError::NoTableAvailable(table_type_id.to_string())),
        }
    }

    /// Renumber the active set, then re-derive the coarse status
    pub(crate) async fn settle(&self, restaurant_id: &str) -> ManagerResult<()> {
        let active_count = self.renumber(restaurant_id).await?;
        let restaurant = self.load_restaurant(restaurant_id).await?;
        self.refresh_wait_status(&restaurant, active_count).await;
        Ok(())
    }

    /// Reassign positions `1..=N` by join time; returns N
    ///
    /// A conflicting position write re-reads the active set once. A second
    /// conflict surfaces directly as `StaleWriteConflict` since the primary
    /// write of the operation has already landed.
    async fn renumber(&self, restaurant_id: &str) -> ManagerResult<usize> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let mut active = self.store.get_active_entries(restaurant_id).await?;
            active.sort_by_key(|e| (e.created_at, e.queue_position));

            let mut conflicted = None;
            for (idx, entry) in active.iter().enumerate() {
                let position = u32::try_from(idx + 1).unwrap_or(u32::MAX);
                if entry.queue_position == position {
                    continue;
                }
                match self
                    .store
                    .update_entry(&entry.id, EntryPatch::position(position), entry.version)
                    .await
                {
                    Ok(_) => {}
                    Err(StoreError::VersionConflict { id, .. }) => {
                        conflicted = Some(id);
                        break;
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            match conflicted {
                None => {
                    tracing::debug!(restaurant_id = %restaurant_id, active = active.len(), "Queue renumbered");
                    return Ok(active.len());
                }
                Some(id) if attempts >= 2 => return Err(ManagerError::StaleWriteConflict(id)),
                Some(id) => {
                    tracing::debug!(restaurant_id = %restaurant_id, entry_id = %id, "Renumber conflict, re-reading queue");
                }
            }
        }
    }

    /// Coarse status from the active count; `closed` is left alone
    pub(crate) async fn refresh_wait_status(&self, restaurant: &Restaurant, active_count: usize) {
        if restaurant.is_closed() {
            return;
        }
        let (status, custom_wait_time) = match active_count {
            0 => (WaitStatus::Available, 0),
            n if n < LONG_WAIT_THRESHOLD => (WaitStatus::Short, restaurant.custom_wait_time),
            _ => (WaitStatus::Long, restaurant.custom_wait_time),
        };
        if status == restaurant.current_wait_status && custom_wait_time == restaurant.custom_wait_time {
            return;
        }

        match self
            .store
            .update_restaurant_wait_status(&restaurant.id, status, custom_wait_time)
            .await
        {
            Ok(()) => tracing::debug!(
                restaurant_id = %restaurant.id,
                from = %restaurant.current_wait_status,
                to = %status,
                "Wait status updated"
            ),
            Err(e) => {
                tracing::error!(restaurant_id = %restaurant.id, error = %e, "Failed to update wait status")
            }
        }
    }

    /// Historical signals for a restaurant; failures count as "no adjustment"
    pub(crate) async fn fetch_signals(&self, restaurant_id: &str) -> Option<HistoricalSignals> {
        let source = self.signals.read().clone();
        match source.historical_signals(restaurant_id).await {
            Ok(signals) => signals,
            Err(e) => {
                tracing::warn!(restaurant_id = %restaurant_id, error = %e, "Historical signals unavailable");
                None
            }
        }
    }

    pub(crate) fn history_context(
        &self,
        signals: Option<HistoricalSignals>,
        restaurant: &Restaurant,
        now: i64,
    ) -> Option<HistoricalContext> {
        signals.map(|signals| {
            let tz = restaurant_tz(restaurant, self.settings.business_tz);
            let (local_hour, weekday) = local_hour_weekday(now, tz);
            HistoricalContext {
                signals,
                local_hour,
                weekday,
            }
        })
    }
}

/// Basic shape checks of a join payload
pub(crate) fn validate_party(party: &PartyInfo) -> ManagerResult<()> {
    if party.customer_name.trim().is_empty() {
        return Err(ManagerError::Validation(
            "customer_name must not be empty".to_string(),
        ));
    }
    if party.party_size == 0 {
        return Err(ManagerError::Validation(
            "party_size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
