//! 排队并发压力测试
//!
//! 多线程运行时下多家餐厅同时入队、通知、入座、取消，
//! 结束后每家餐厅的活跃位置必须恰好是 1..=N。

use queue_engine::utils::ManualClock;
use queue_engine::{Config, EngineState, MemoryStore, TransitionExtra};
use rand::{Rng, SeedableRng};
use shared::{PartyInfo, Restaurant, TableType, WaitStatus, WaitlistStatus};
use std::sync::Arc;

const RESTAURANTS: usize = 4;
const PARTIES_PER_TASK: usize = 40;
const TASKS: usize = 16;

fn seed(store: &MemoryStore) {
    for r in 0..RESTAURANTS {
        let id = format!("r-{}", r);
        store.upsert_restaurant(Restaurant {
            id: id.clone(),
            name: format!("Restaurant {}", r),
            current_wait_status: WaitStatus::Available,
            custom_wait_time: 0,
            use_advanced_queue: r % 2 == 0,
            table_capacity: 30,
            timezone: None,
        });
        for (capacity, count) in [(2, 4), (4, 3), (8, 1)] {
            store.upsert_table_type(TableType {
                id: format!("{}-t{}", id, capacity),
                restaurant_id: id.clone(),
                name: format!("{}-top", capacity),
                capacity,
                count,
                estimated_turnover_time: 45,
                is_active: true,
            });
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mixed_operations_keep_positions_contiguous() {
    let store = Arc::new(MemoryStore::new());
    seed(&store);
    let clock = Arc::new(ManualClock::new(1_780_000_000_000));
    let state = EngineState::with_store(&Config::default(), store.clone(), clock.clone());

    let mut handles = Vec::new();
    for task in 0..TASKS {
        let state = state.clone();
        let clock = clock.clone();
        handles.push(tokio::spawn(async move {
            let mut rng = rand::rngs::StdRng::seed_from_u64(task as u64);
            let restaurant_id = format!("r-{}", task % RESTAURANTS);
            for i in 0..PARTIES_PER_TASK {
                clock.advance_minutes(1);
                let entry = state
                    .manager
                    .join(
                        &restaurant_id,
                        PartyInfo {
                            customer_name: format!("T{}-P{}", task, i),
                            party_size: rng.gen_range(1..=8),
                            ..Default::default()
                        },
                    )
                    .await
                    .expect("join failed");

                match rng.gen_range(0..3) {
                    0 => {
                        state
                            .manager
                            .transition(&entry.id, WaitlistStatus::Cancelled, TransitionExtra::default())
                            .await
                            .expect("cancel failed");
                    }
                    1 => {
                        state
                            .manager
                            .transition(&entry.id, WaitlistStatus::Notified, TransitionExtra::default())
                            .await
                            .expect("notify failed");
                        // may legitimately fail when every table is taken
                        let _ = state
                            .manager
                            .transition(&entry.id, WaitlistStatus::Seated, TransitionExtra::default())
                            .await;
                    }
                    _ => {}
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for r in 0..RESTAURANTS {
        let queue = state.manager.active_queue(&format!("r-{}", r)).await.unwrap();
        let positions: Vec<u32> = queue.iter().map(|e| e.queue_position).collect();
        let expected: Vec<u32> = (1..=queue.len() as u32).collect();
        assert_eq!(positions, expected, "restaurant r-{}", r);
    }
}
