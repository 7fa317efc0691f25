//! Table efficiency metrics
//!
//! Per table type: how well seated parties matched table size, how busy the
//! type is right now, and how long parties actually stay.

use serde::{Deserialize, Serialize};
use shared::util::MINUTE_MILLIS;
use shared::{TableType, WaitlistEntry};

use super::allocator::efficiency;
use super::availability::TableAvailability;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEfficiency {
    pub table_type_id: String,
    pub table_name: String,
    pub capacity: u32,
    pub parties_seated: u32,
    pub guests_seated: u32,
    pub seats_offered: u32,
    pub average_seat_wastage: f64,
    /// 0..=100, same formula as allocation
    pub average_efficiency: f64,
    /// guests / seats offered, in percent
    pub utilization: f64,
    pub occupied: u32,
    pub available: u32,
    /// Mean minutes from seating to release, over released parties
    pub observed_turnover_time: Option<u32>,
}

impl TableEfficiency {
    /// Observed stay differs from the configured turnover by more than `tolerance` minutes
    pub fn turnover_drift(&self, configured: u32, tolerance: u32) -> Option<i64> {
        let observed = self.observed_turnover_time?;
        let drift = i64::from(observed) - i64::from(configured);
        (drift.unsigned_abs() > u64::from(tolerance)).then_some(drift)
    }
}

/// Summarise `seated` entries per table type (staff order)
pub fn summarize(
    table_types: &[TableType],
    seated: &[WaitlistEntry],
    availability: &TableAvailability,
) -> Vec<TableEfficiency> {
    table_types
        .iter()
        .map(|t| {
            let parties: Vec<&WaitlistEntry> = seated
                .iter()
                .filter(|e| e.table_type_id.as_deref() == Some(t.id.as_str()))
                .collect();
            let parties_seated = u32::try_from(parties.len()).unwrap_or(u32::MAX);
            let guests_seated: u32 = parties.iter().map(|e| e.party_size).sum();
            let seats_offered = parties_seated.saturating_mul(t.capacity);

            let wastages: Vec<u32> = parties
                .iter()
                .map(|e| t.capacity.saturating_sub(e.party_size))
                .collect();
            let average_seat_wastage = mean(wastages.iter().map(|&w| f64::from(w)));
            let average_efficiency = mean(wastages.iter().map(|&w| f64::from(efficiency(w))));
            let utilization = if seats_offered == 0 {
                0.0
            } else {
                f64::from(guests_seated) / f64::from(seats_offered) * 100.0
            };

            let stays: Vec<f64> = parties
                .iter()
                .filter_map(|e| {
                    let seated_at = e.seated_at?;
                    let released_at = e.table_released_at?;
                    Some((released_at - seated_at).max(0) as f64 / MINUTE_MILLIS as f64)
                })
                .collect();
            let observed_turnover_time = (!stays.is_empty())
                .then(|| mean(stays.iter().copied()).round() as u32);

            let (occupied, available) = availability
                .get(&t.id)
                .map(|a| (a.occupied, a.available_count))
                .unwrap_or((0, 0));

            TableEfficiency {
                table_type_id: t.id.clone(),
                table_name: t.name.clone(),
                capacity: t.capacity,
                parties_seated,
                guests_seated,
                seats_offered,
                average_seat_wastage,
                average_efficiency,
                utilization,
                occupied,
                available,
                observed_turnover_time,
            }
        })
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0u32), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / f64::from(n) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waitlist::test_support::{seated_entry, table_type};

    const MIN: i64 = MINUTE_MILLIS;

    #[test]
    fn test_summary_per_type() {
        let types = vec![table_type("t4", 4, 2, 60), table_type("t2", 2, 1, 30)];
        let mut a = seated_entry("a", "t4", 0, Some(50 * MIN));
        a.party_size = 4;
        let mut b = seated_entry("b", "t4", 10 * MIN, Some(80 * MIN));
        b.party_size = 2;
        let mut c = seated_entry("c", "t4", 100 * MIN, None);
        c.party_size = 3;
        let seated = vec![a, b, c];
        let availability = TableAvailability::derive(&types, &seated, 110 * MIN);

        let summary = summarize(&types, &seated, &availability);
        let t4 = &summary[0];
        assert_eq!(t4.parties_seated, 3);
        assert_eq!(t4.guests_seated, 9);
        assert_eq!(t4.seats_offered, 12);
        // wastage 0, 2, 1
        assert!((t4.average_seat_wastage - 1.0).abs() < 1e-9);
        assert!((t4.average_efficiency - 80.0).abs() < 1e-9);
        assert!((t4.utilization - 75.0).abs() < 1e-9);
        assert_eq!(t4.occupied, 1);
        assert_eq!(t4.available, 1);
        assert_eq!(t4.observed_turnover_time, Some(60));
        assert_eq!(t4.turnover_drift(60, 5), None);
        assert_eq!(t4.turnover_drift(45, 5), Some(15));

        let t2 = &summary[1];
        assert_eq!(t2.parties_seated, 0);
        assert_eq!(t2.utilization, 0.0);
        assert_eq!(t2.observed_turnover_time, None);
        assert_eq!(t2.available, 1);
    }
}
