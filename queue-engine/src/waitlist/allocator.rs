//! Table Allocator
//!
//! Pure selection of a table type for a party. Advisory only: nothing is held
//! until the party is actually seated.

use serde::{Deserialize, Serialize};
use shared::WaitlistEntry;
use std::fmt;
use std::str::FromStr;

use super::availability::AvailableTable;

/// 分配策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// First eligible type in staff order
    FirstFit,
    /// Least wasted seats
    #[default]
    BestFit,
    /// Fastest turnover, then least wasted seats
    OptimizeTurnover,
}

impl AllocationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStrategy::FirstFit => "first_fit",
            AllocationStrategy::BestFit => "best_fit",
            AllocationStrategy::OptimizeTurnover => "optimize_turnover",
        }
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first_fit" => Ok(AllocationStrategy::FirstFit),
            "best_fit" => Ok(AllocationStrategy::BestFit),
            "optimize_turnover" => Ok(AllocationStrategy::OptimizeTurnover),
            other => Err(format!("Unknown allocation strategy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableAssignment {
    pub table_type_id: String,
    pub table_name: String,
    pub capacity: u32,
    pub seat_wastage: u32,
    /// 0..=100
    pub efficiency: u32,
}

/// `max(0, 100 - 20 × wastage)`
pub fn efficiency(seat_wastage: u32) -> u32 {
    100u32.saturating_sub(seat_wastage.saturating_mul(20))
}

/// Pick a table type for `party_size` among types with a free table
pub fn allocate(
    party_size: u32,
    available: &[AvailableTable],
    strategy: AllocationStrategy,
) -> Option<TableAssignment> {
    let mut candidates = available
        .iter()
        .enumerate()
        .filter(|(_, t)| t.has_free() && t.table_type.fits(party_size));

    let chosen = match strategy {
        AllocationStrategy::FirstFit => candidates.next(),
        AllocationStrategy::BestFit => {
            candidates.min_by_key(|(idx, t)| (t.table_type.capacity - party_size, *idx))
        }
        AllocationStrategy::OptimizeTurnover => candidates.min_by_key(|(idx, t)| {
            let turnover = match t.table_type.estimated_turnover_time {
                0 => u32::MAX,
                n => n,
            };
            (turnover, t.table_type.capacity - party_size, *idx)
        }),
    };

    chosen.map(|(_, t)| {
        let seat_wastage = t.table_type.capacity - party_size;
        TableAssignment {
            table_type_id: t.table_type.id.clone(),
            table_name: t.table_type.name.clone(),
            capacity: t.table_type.capacity,
            seat_wastage,
            efficiency: efficiency(seat_wastage),
        }
    })
}

/// Table the entry may be moved to `ready_to_seat` for, if any
///
/// A free fitting table must exist and no active party ahead of `entry` may
/// fit that same table, whether or not it has arrived. `active` is the
/// restaurant's active set.
pub fn ready_to_seat_assignment(
    entry: &WaitlistEntry,
    active: &[WaitlistEntry],
    available: &[AvailableTable],
    strategy: AllocationStrategy,
) -> Option<TableAssignment> {
    let assignment = allocate(entry.party_size, available, strategy)?;
    let blocked = active.iter().any(|other| {
        other.id != entry.id
            && other.queue_position < entry.queue_position
            && other.party_size <= assignment.capacity
    });
    (!blocked).then_some(assignment)
}
