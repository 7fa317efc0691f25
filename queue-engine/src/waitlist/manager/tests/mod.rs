use super::*;
use crate::db::MemoryStore;
use crate::utils::ManualClock;
use crate::waitlist::test_support::{restaurant, table_type};

const START: i64 = 1_780_000_000_000;

struct Harness {
    manager: QueueManager,
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
}

fn create_test_manager(advanced: bool, tables: Vec<TableType>) -> Harness {
    let store = Arc::new(MemoryStore::new());
    store.upsert_restaurant(restaurant(advanced));
    for t in tables {
        store.upsert_table_type(t);
    }
    let clock = Arc::new(ManualClock::new(START));
    let manager = QueueManager::new(store.clone(), clock.clone(), QueueSettings::default());
    Harness {
        manager,
        store,
        clock,
    }
}

fn party(name: &str, size: u32) -> PartyInfo {
    PartyInfo {
        customer_name: name.to_string(),
        party_size: size,
        phone_number: Some("+34600000000".to_string()),
        ..Default::default()
    }
}

// ========================================================================
// Helpers
// ========================================================================

impl Harness {
    /// Join with the clock advanced one second so join order is strict
    async fn join(&self, name: &str, size: u32) -> WaitlistEntry {
        self.clock.set(self.clock.now_millis() + 1_000);
        self.manager.join("r-1", party(name, size)).await.unwrap()
    }

    async fn move_to(&self, entry_id: &str, next: WaitlistStatus) -> ManagerResult<WaitlistEntry> {
        self.manager
            .transition(entry_id, next, TransitionExtra::default())
            .await
    }

    async fn positions(&self) -> Vec<(String, u32)> {
        self.manager
            .active_queue("r-1")
            .await
            .unwrap()
            .into_iter()
            .map(|e| (e.customer_name, e.queue_position))
            .collect()
    }

    async fn restaurant(&self) -> Restaurant {
        self.store.get_restaurant("r-1").await.unwrap().unwrap()
    }
}

/// Active positions are exactly 1..=N
fn assert_contiguous(positions: &[(String, u32)]) {
    let mut nums: Vec<u32> = positions.iter().map(|(_, p)| *p).collect();
    nums.sort_unstable();
    let expected: Vec<u32> = (1..=u32::try_from(nums.len()).unwrap()).collect();
    assert_eq!(nums, expected, "positions not contiguous: {:?}", positions);
}
