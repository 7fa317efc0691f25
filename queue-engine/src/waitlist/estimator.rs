//! Wait Estimator
//!
//! Pure function from (restaurant, queue, availability, party size, optional
//! history) to a wait in minutes, always a non-negative multiple of 5.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use shared::{Restaurant, WaitStatus, WaitlistEntry};

use super::availability::{DEFAULT_TURNOVER_MINUTES, TableAvailability};
use super::signals::HistoricalSignals;

/// Returned when no active table type can ever seat the party
pub const NO_CAPACITY_WAIT_MINUTES: u32 = 120;

/// Parties larger than this wait ×1.5
const LARGE_PARTY_THRESHOLD: u32 = 4;
const LARGE_PARTY_MULTIPLIER: f64 = 1.5;
/// Parties within this many guests of the target count as "similar"
const SIMILAR_PARTY_RANGE: u32 = 2;

/// 估算可信度（仅描述性）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitEstimate {
    pub minutes: u32,
    pub confidence: Confidence,
}

/// Historical signal plus the restaurant-local time it applies to
#[derive(Debug, Clone)]
pub struct HistoricalContext {
    pub signals: HistoricalSignals,
    pub local_hour: u32,
    pub weekday: Weekday,
}

/// Base minutes for a coarse wait status
pub fn base_minutes(status: WaitStatus) -> u32 {
    match status {
        WaitStatus::Available | WaitStatus::Closed => 0,
        WaitStatus::Short => 15,
        WaitStatus::Long => 30,
        WaitStatus::VeryLong => 60,
    }
}

/// Round up to the next multiple of 5; garbage and negatives become 0
pub fn round_up_to_five(minutes: f64) -> u32 {
    if !minutes.is_finite() || minutes <= 0.0 {
        return 0;
    }
    // epsilon keeps 15.000000001 from becoming 20
    let rounded = ((minutes / 5.0) - 1e-9).ceil() * 5.0;
    if rounded >= f64::from(u32::MAX) {
        u32::MAX - u32::MAX % 5
    } else {
        rounded.max(0.0) as u32
    }
}

pub fn estimate(
    restaurant: &Restaurant,
    active: &[WaitlistEntry],
    availability: &TableAvailability,
    party_size: u32,
    historical: Option<&HistoricalContext>,
) -> WaitEstimate {
    let confidence = if restaurant.use_advanced_queue {
        Confidence::High
    } else if restaurant.custom_wait_time > 0 {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    let mut minutes = f64::from(if restaurant.custom_wait_time > 0 {
        restaurant.custom_wait_time
    } else {
        base_minutes(restaurant.current_wait_status)
    });
    if party_size > LARGE_PARTY_THRESHOLD {
        minutes *= LARGE_PARTY_MULTIPLIER;
    }

    if restaurant.use_advanced_queue {
        let eligible: Vec<_> = availability.eligible(party_size).collect();
        if eligible.is_empty() {
            return WaitEstimate {
                minutes: NO_CAPACITY_WAIT_MINUTES,
                confidence,
            };
        }

        let similar = active
            .iter()
            .filter(|e| e.party_size.abs_diff(party_size) <= SIMILAR_PARTY_RANGE)
            .count();
        let reported: Vec<u32> = eligible
            .iter()
            .map(|t| t.table_type.estimated_turnover_time)
            .filter(|&m| m > 0)
            .collect();
        let avg_turnover = if reported.is_empty() {
            f64::from(DEFAULT_TURNOVER_MINUTES)
        } else {
            f64::from(reported.iter().sum::<u32>()) / reported.len() as f64
        };
        let free_seats: u64 = eligible.iter().map(|t| t.free_seats()).sum();
        minutes += similar as f64 * avg_turnover / free_seats.max(1) as f64;
    }

    if let Some(ctx) = historical {
        minutes *= ctx.signals.multiplier(party_size, ctx.local_hour, ctx.weekday);
    }

    WaitEstimate {
        minutes: round_up_to_five(minutes),
        confidence,
    }
}
