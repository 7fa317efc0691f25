//! In-memory store
//!
//! | Map | Key | Value |
//! |-----|-----|-------|
//! | `restaurants` | restaurant_id | `Restaurant` |
//! | `table_types` | restaurant_id | `Vec<TableType>` (staff order) |
//! | `entries` | entry_id | `WaitlistEntry` |

use super::{StoreError, StoreResult, WaitlistStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared::{EntryPatch, Restaurant, TableType, WaitStatus, WaitlistEntry, WaitlistStatus};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Default)]
pub struct MemoryStore {
    restaurants: RwLock<HashMap<String, Restaurant>>,
    table_types: RwLock<HashMap<String, Vec<TableType>>>,
    entries: RwLock<HashMap<String, WaitlistEntry>>,
    /// Pending forced version conflicts (test hook)
    forced_conflicts: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a restaurant record (staff side)
    pub fn upsert_restaurant(&self, restaurant: Restaurant) {
        self.restaurants
            .write()
            .insert(restaurant.id.clone(), restaurant);
    }

    /// Create or replace a table type, keeping staff ordering (staff side)
    pub fn upsert_table_type(&self, table_type: TableType) {
        let mut map = self.table_types.write();
        let list = map.entry(table_type.restaurant_id.clone()).or_default();
        match list.iter_mut().find(|t| t.id == table_type.id) {
            Some(existing) => *existing = table_type,
            None => list.push(table_type),
        }
    }

    /// Make the next `n` entry updates fail with a version conflict
    pub fn force_version_conflicts(&self, n: u32) {
        self.forced_conflicts.store(n, Ordering::SeqCst);
    }

    fn take_forced_conflict(&self) -> bool {
        self.forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl WaitlistStore for MemoryStore {
    async fn get_restaurant(&self, restaurant_id: &str) -> StoreResult<Option<Restaurant>> {
        Ok(self.restaurants.read().get(restaurant_id).cloned())
    }

    async fn list_restaurant_ids(&self) -> StoreResult<Vec<String>> {
        let mut ids: Vec<String> = self.restaurants.read().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn update_restaurant_wait_status(
        &self,
        restaurant_id: &str,
        status: WaitStatus,
        custom_wait_time: u32,
    ) -> StoreResult<()> {
        let mut map = self.restaurants.write();
        let restaurant = map
            .get_mut(restaurant_id)
            .ok_or_else(|| StoreError::NotFound(format!("Restaurant {}", restaurant_id)))?;
        restaurant.current_wait_status = status;
        restaurant.custom_wait_time = custom_wait_time;
        Ok(())
    }

    async fn get_table_types(&self, restaurant_id: &str) -> StoreResult<Vec<TableType>> {
        Ok(self
            .table_types
            .read()
            .get(restaurant_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_active_entries(&self, restaurant_id: &str) -> StoreResult<Vec<WaitlistEntry>> {
        let mut active: Vec<WaitlistEntry> = self
            .entries
            .read()
            .values()
            .filter(|e| e.restaurant_id == restaurant_id && e.is_active())
            .cloned()
            .collect();
        active.sort_by_key(|e| (e.queue_position, e.created_at));
        Ok(active)
    }

    async fn get_seated_entries(
        &self,
        restaurant_id: &str,
        since: i64,
    ) -> StoreResult<Vec<WaitlistEntry>> {
        let mut seated: Vec<WaitlistEntry> = self
            .entries
            .read()
            .values()
            .filter(|e| {
                e.restaurant_id == restaurant_id
                    && e.status == WaitlistStatus::Seated
                    && e.seated_at.is_some_and(|t| t >= since)
            })
            .cloned()
            .collect();
        seated.sort_by_key(|e| e.seated_at);
        Ok(seated)
    }

    async fn get_entry(&self, entry_id: &str) -> StoreResult<Option<WaitlistEntry>> {
        Ok(self.entries.read().get(entry_id).cloned())
    }

    async fn get_entry_by_confirmation_code(
        &self,
        code: &str,
    ) -> StoreResult<Option<WaitlistEntry>> {
        let entries = self.entries.read();
        let mut holders: Vec<&WaitlistEntry> = entries
            .values()
            .filter(|e| e.confirmation_code.as_deref() == Some(code))
            .collect();
        // active holder first, then most recent
        holders.sort_by_key(|e| (e.status.is_terminal(), std::cmp::Reverse(e.created_at)));
        Ok(holders.first().map(|e| (*e).clone()))
    }

    async fn insert_entry(&self, entry: WaitlistEntry) -> StoreResult<WaitlistEntry> {
        let mut entries = self.entries.write();
        if entries.contains_key(&entry.id) {
            return Err(StoreError::Duplicate(format!("Entry {}", entry.id)));
        }
        if let Some(code) = entry.confirmation_code.as_deref()
            && entries
                .values()
                .any(|e| e.is_active() && e.confirmation_code.as_deref() == Some(code))
        {
            return Err(StoreError::DuplicateConfirmationCode(code.to_string()));
        }
        entries.insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    async fn update_entry(
        &self,
        entry_id: &str,
        patch: EntryPatch,
        expected_version: u64,
    ) -> StoreResult<WaitlistEntry> {
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(entry_id)
            .ok_or_else(|| StoreError::NotFound(format!("Entry {}", entry_id)))?;
        if entry.version != expected_version || self.take_forced_conflict() {
            return Err(StoreError::VersionConflict {
                id: entry_id.to_string(),
                expected: expected_version,
                actual: entry.version,
            });
        }
        patch.apply(entry);
        Ok(entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, position: u32, status: WaitlistStatus) -> WaitlistEntry {
        WaitlistEntry {
            id: id.to_string(),
            restaurant_id: "r-1".to_string(),
            customer_name: format!("Guest {}", id),
            party_size: 2,
            phone_number: None,
            email: None,
            notes: None,
            dietary_requirements: vec![],
            status,
            queue_position: position,
            estimated_wait_time: 0,
            table_type_id: None,
            is_remote: false,
            confirmation_code: None,
            expected_arrival_time: None,
            arrived_at: None,
            created_at: i64::from(position),
            notified_at: None,
            seated_at: None,
            cancelled_at: None,
            table_released_at: None,
            version: 0,
        }
    }

    #[tokio::test]
    async fn test_active_entries_sorted_and_filtered() {
        let store = MemoryStore::new();
        store.insert_entry(entry("b", 2, WaitlistStatus::Waiting)).await.unwrap();
        store.insert_entry(entry("a", 1, WaitlistStatus::Notified)).await.unwrap();
        store.insert_entry(entry("c", 3, WaitlistStatus::Cancelled)).await.unwrap();

        let active = store.get_active_entries("r-1").await.unwrap();
        let ids: Vec<&str> = active.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(store.get_active_entries("r-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_confirmation_code_only_among_active() {
        let store = MemoryStore::new();
        let mut first = entry("a", 1, WaitlistStatus::RemotePending);
        first.confirmation_code = Some("ABC234".to_string());
        store.insert_entry(first).await.unwrap();

        let mut second = entry("b", 2, WaitlistStatus::RemotePending);
        second.confirmation_code = Some("ABC234".to_string());
        let err = store.insert_entry(second.clone()).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateConfirmationCode(_)));

        store
            .update_entry("a", EntryPatch::status(WaitlistStatus::Cancelled), 0)
            .await
            .unwrap();
        store.insert_entry(second).await.unwrap();

        let found = store
            .get_entry_by_confirmation_code("ABC234")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "b");
    }

    #[tokio::test]
    async fn test_version_conflict() {
        let store = MemoryStore::new();
        store.insert_entry(entry("a", 1, WaitlistStatus::Waiting)).await.unwrap();

        let updated = store
            .update_entry("a", EntryPatch::position(1), 0)
            .await
            .unwrap();
        assert_eq!(updated.version, 1);

        let err = store
            .update_entry("a", EntryPatch::position(1), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { actual: 1, .. }));
    }

    #[tokio::test]
    async fn test_forced_conflicts_are_consumed() {
        let store = MemoryStore::new();
        store.insert_entry(entry("a", 1, WaitlistStatus::Waiting)).await.unwrap();
        store.force_version_conflicts(1);

        assert!(store.update_entry("a", EntryPatch::position(1), 0).await.is_err());
        assert!(store.update_entry("a", EntryPatch::position(1), 0).await.is_ok());
    }

    #[tokio::test]
    async fn test_table_type_upsert_keeps_order() {
        let store = MemoryStore::new();
        let mut t = TableType {
            id: "t-2".to_string(),
            restaurant_id: "r-1".to_string(),
            name: "Two".to_string(),
            capacity: 2,
            count: 3,
            estimated_turnover_time: 40,
            is_active: true,
        };
        store.upsert_table_type(t.clone());
        store.upsert_table_type(TableType {
            id: "t-4".to_string(),
            name: "Four".to_string(),
            capacity: 4,
            ..t.clone()
        });
        t.count = 5;
        store.upsert_table_type(t);

        let types = store.get_table_types("r-1").await.unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].id, "t-2");
        assert_eq!(types[0].count, 5);
    }
}
