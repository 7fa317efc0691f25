//! Capacity Predictor
//!
//! Read-only forecast for a hypothetical party: blends the live queue, table
//! availability and historical signals. Never takes the restaurant lock and
//! never writes.

use serde::{Deserialize, Serialize};
use shared::util::minutes_to_millis;
use std::sync::Arc;

use super::allocator::{self, TableAssignment};
use super::estimator::{self, Confidence};
use super::manager::{ManagerError, ManagerResult, QueueManager};
use super::metrics::{self, TableEfficiency};

/// Recommended arrival lead before the table frees up
const ARRIVAL_LEAD_MINUTES: u32 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityPrediction {
    pub restaurant_id: String,
    pub party_size: u32,
    /// Minutes
    pub estimated_wait_time: u32,
    /// Unix millis
    pub next_available_time: i64,
    /// Unix millis, never before the prediction time
    pub recommended_arrival_time: i64,
    pub confidence: Confidence,
    /// Best table right now (advanced queue only)
    pub suggested_table: Option<TableAssignment>,
    pub generated_at: i64,
}

#[derive(Debug, Clone)]
pub struct CapacityPredictor {
    manager: Arc<QueueManager>,
}

impl CapacityPredictor {
    pub fn new(manager: Arc<QueueManager>) -> Self {
        Self { manager }
    }

    pub async fn predict(
        &self,
        restaurant_id: &str,
        party_size: u32,
    ) -> ManagerResult<CapacityPrediction> {
        if party_size == 0 {
            return Err(ManagerError::Validation(
                "party_size must be at least 1".to_string(),
            ));
        }

        let now = self.manager.now();
        let restaurant = self.manager.load_restaurant(restaurant_id).await?;
        let active = self.manager.store().get_active_entries(restaurant_id).await?;
        let (_, availability) = self.manager.snapshot(restaurant_id, now).await?;
        let signals = self.manager.fetch_signals(restaurant_id).await;
        let context = self.manager.history_context(signals, &restaurant, now);

        let wait = estimator::estimate(&restaurant, &active, &availability, party_size, context.as_ref());
        let suggested_table = if restaurant.use_advanced_queue {
            allocator::allocate(party_size, availability.tables(), self.manager.settings().strategy)
        } else {
            None
        };

        let next_available_time = now + minutes_to_millis(wait.minutes);
        let recommended_arrival_time =
            (next_available_time - minutes_to_millis(ARRIVAL_LEAD_MINUTES)).max(now);

        tracing::debug!(
            restaurant_id = %restaurant_id,
            party_size,
            wait_minutes = wait.minutes,
            historical = context.is_some(),
            "Capacity predicted"
        );

        Ok(CapacityPrediction {
            restaurant_id: restaurant_id.to_string(),
            party_size,
            estimated_wait_time: wait.minutes,
            next_available_time,
            recommended_arrival_time,
            confidence: wait.confidence,
            suggested_table,
            generated_at: now,
        })
    }

    /// Per-table-type efficiency over parties seated since `since` (Unix millis)
    pub async fn table_efficiency(
        &self,
        restaurant_id: &str,
        since: i64,
    ) -> ManagerResult<Vec<TableEfficiency>> {
        let now = self.manager.now();
        self.manager.load_restaurant(restaurant_id).await?;
        let (table_types, availability) = self.manager.snapshot(restaurant_id, now).await?;
        let seated = self
            .manager
            .store()
            .get_seated_entries(restaurant_id, since)
            .await?;
        Ok(metrics::summarize(&table_types, &seated, &availability))
    }
}
