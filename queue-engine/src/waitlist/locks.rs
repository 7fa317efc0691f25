//! Per-restaurant critical sections
//!
//! One async mutex per restaurant id. Mutations of different restaurants never
//! contend with each other.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct RestaurantLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RestaurantLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the restaurant's lock, or `None` once `timeout` elapses
    pub async fn acquire(
        &self,
        restaurant_id: &str,
        timeout: Duration,
    ) -> Option<OwnedMutexGuard<()>> {
        // clone the Arc so the DashMap shard is not held across the await
        let lock = self
            .locks
            .entry(restaurant_id.to_string())
            .or_default()
            .clone();
        tokio::time::timeout(timeout, lock.lock_owned()).await.ok()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_restaurant_serialises() {
        let locks = RestaurantLocks::new();
        let guard = locks.acquire("r-1", Duration::from_millis(50)).await;
        assert!(guard.is_some());
        assert!(locks.acquire("r-1", Duration::from_millis(20)).await.is_none());
        drop(guard);
        assert!(locks.acquire("r-1", Duration::from_millis(20)).await.is_some());
    }

    #[tokio::test]
    async fn test_restaurants_are_independent() {
        let locks = RestaurantLocks::new();
        let _a = locks.acquire("r-1", Duration::from_millis(50)).await.unwrap();
        let b = locks.acquire("r-2", Duration::from_millis(50)).await;
        assert!(b.is_some());
        assert_eq!(locks.len(), 2);
    }
}
