//! Seating analytics collaborator
//!
//! The engine only hands seatings over ([`SeatingAnalytics`]) and reads back
//! aggregated signals ([`HistoricalSignalSource`]). [`InMemoryAnalytics`]
//! keeps both sides in process: recorded seatings are rolled up per local day
//! and merged with any externally seeded [`DailySignal`] rows.

use async_trait::async_trait;
use chrono::{NaiveDate, Timelike};
use chrono_tz::Tz;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::CollaboratorError;
use crate::utils::time::{local_date, Clock};
use crate::waitlist::signals::{DailySignal, HistoricalSignals};

/// One seating, handed to analytics after the party sits down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatingRecord {
    pub restaurant_id: String,
    pub table_type_id: Option<String>,
    pub party_size: u32,
    pub seated_at: i64,
    pub arrived_at: Option<i64>,
}

#[async_trait]
pub trait SeatingAnalytics: Send + Sync {
    async fn record_seating(&self, record: SeatingRecord) -> Result<(), CollaboratorError>;
}

#[async_trait]
pub trait HistoricalSignalSource: Send + Sync {
    /// `Ok(None)` means "no adjustment"
    async fn historical_signals(
        &self,
        restaurant_id: &str,
    ) -> Result<Option<HistoricalSignals>, CollaboratorError>;
}

/// Source without any history
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHistory;

#[async_trait]
impl HistoricalSignalSource for NoHistory {
    async fn historical_signals(
        &self,
        _restaurant_id: &str,
    ) -> Result<Option<HistoricalSignals>, CollaboratorError> {
        Ok(None)
    }
}

#[async_trait]
impl SeatingAnalytics for NoHistory {
    async fn record_seating(&self, _record: SeatingRecord) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// In-process analytics store
#[derive(Debug)]
pub struct InMemoryAnalytics {
    clock: Arc<dyn Clock>,
    tz: Tz,
    window_days: u32,
    records: RwLock<Vec<SeatingRecord>>,
    /// restaurant_id -> seeded rows (win over rolled-up days)
    seeded: RwLock<HashMap<String, Vec<DailySignal>>>,
}

impl InMemoryAnalytics {
    pub fn new(clock: Arc<dyn Clock>, tz: Tz, window_days: u32) -> Self {
        Self {
            clock,
            tz,
            window_days,
            records: RwLock::new(Vec::new()),
            seeded: RwLock::new(HashMap::new()),
        }
    }

    /// Load pre-aggregated daily rows for a restaurant
    pub fn seed_daily(&self, restaurant_id: &str, rows: Vec<DailySignal>) {
        self.seeded
            .write()
            .entry(restaurant_id.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn records(&self) -> Vec<SeatingRecord> {
        self.records.read().clone()
    }

    /// First local day still inside the signal window
    fn window_start(&self) -> NaiveDate {
        let today = local_date(self.clock.now_millis(), self.tz);
        today - chrono::Duration::days(i64::from(self.window_days))
    }

    /// Drop seatings that fell out of the window; returns how many were dropped
    fn prune(&self) -> usize {
        let window_start = self.window_start();
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|r| local_date(r.seated_at, self.tz) > window_start);
        before - records.len()
    }

    /// Roll recorded seatings up into one row per local day
    fn rollup(&self, restaurant_id: &str) -> BTreeMap<NaiveDate, DailySignal> {
        // date -> (hour -> parties, total guests)
        let mut days: BTreeMap<NaiveDate, (BTreeMap<u32, u32>, u64)> = BTreeMap::new();
        for r in self
            .records
            .read()
            .iter()
            .filter(|r| r.restaurant_id == restaurant_id)
        {
            let Some(local) = chrono::DateTime::from_timestamp_millis(r.seated_at) else {
                continue;
            };
            let local = local.with_timezone(&self.tz);
            let slot = days.entry(local.date_naive()).or_default();
            *slot.0.entry(local.hour()).or_default() += 1;
            slot.1 += u64::from(r.party_size);
        }

        days.into_iter()
            .map(|(date, (hours, guests))| {
                let party_count: u32 = hours.values().sum();
                let peak_hour = hours
                    .iter()
                    .fold(None::<(u32, u32)>, |best, (&h, &n)| match best {
                        Some((_, best_n)) if best_n >= n => best,
                        _ => Some((h, n)),
                    })
                    .map(|(h, _)| h);
                let signal = DailySignal {
                    date,
                    peak_hour,
                    party_count,
                    average_party_size: guests as f64 / f64::from(party_count.max(1)),
                };
                (date, signal)
            })
            .collect()
    }
}

#[async_trait]
impl SeatingAnalytics for InMemoryAnalytics {
    async fn record_seating(&self, record: SeatingRecord) -> Result<(), CollaboratorError> {
        tracing::debug!(
            restaurant_id = %record.restaurant_id,
            party_size = record.party_size,
            "Seating recorded"
        );
        self.records.write().push(record);
        let dropped = self.prune();
        if dropped > 0 {
            tracing::debug!(dropped, "Pruned seatings outside the signal window");
        }
        Ok(())
    }
}

#[async_trait]
impl HistoricalSignalSource for InMemoryAnalytics {
    async fn historical_signals(
        &self,
        restaurant_id: &str,
    ) -> Result<Option<HistoricalSignals>, CollaboratorError> {
        let mut days = self.rollup(restaurant_id);
        if let Some(rows) = self.seeded.read().get(restaurant_id) {
            for row in rows {
                days.insert(row.date, row.clone());
            }
        }
        let today = local_date(self.clock.now_millis(), self.tz);
        let daily: Vec<DailySignal> = days.into_values().collect();
        Ok(HistoricalSignals::aggregate(&daily, today, self.window_days))
    }
}
