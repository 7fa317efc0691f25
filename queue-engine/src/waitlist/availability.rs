//! Live table availability snapshot
//!
//! A seated entry holds its table type until staff release it or until
//! `seated_at + estimated_turnover_time` has passed, whichever comes first.

use serde::Serialize;
use shared::util::minutes_to_millis;
use shared::{TableType, WaitlistEntry, WaitlistStatus};

/// Turnover assumed when a table type does not report one
pub const DEFAULT_TURNOVER_MINUTES: u32 = 45;

/// How far back seated entries are loaded to derive occupancy
pub const OCCUPANCY_LOOKBACK_MILLIS: i64 = 24 * 60 * shared::util::MINUTE_MILLIS;

/// Turnover in minutes, falling back to the default for 0
pub fn effective_turnover(table_type: &TableType) -> u32 {
    if table_type.estimated_turnover_time == 0 {
        DEFAULT_TURNOVER_MINUTES
    } else {
        table_type.estimated_turnover_time
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailableTable {
    pub table_type: TableType,
    pub occupied: u32,
    /// `count - occupied`, never below 0
    pub available_count: u32,
}

impl AvailableTable {
    pub fn has_free(&self) -> bool {
        self.available_count > 0
    }

    pub fn free_seats(&self) -> u64 {
        u64::from(self.available_count) * u64::from(self.table_type.capacity)
    }
}

/// Availability of every active table type of one restaurant (staff order)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableAvailability {
    tables: Vec<AvailableTable>,
}

impl TableAvailability {
    pub fn derive(table_types: &[TableType], seated: &[WaitlistEntry], now: i64) -> Self {
        let tables = table_types
            .iter()
            .filter(|t| t.is_active)
            .map(|t| {
                let occupied = seated
                    .iter()
                    .filter(|e| e.table_type_id.as_deref() == Some(t.id.as_str()))
                    .filter(|e| is_occupying(e, t, now))
                    .count();
                let occupied = u32::try_from(occupied).unwrap_or(u32::MAX);
                AvailableTable {
                    table_type: t.clone(),
                    occupied,
                    available_count: t.count.saturating_sub(occupied),
                }
            })
            .collect();
        Self { tables }
    }

    pub fn tables(&self) -> &[AvailableTable] {
        &self.tables
    }

    pub fn get(&self, table_type_id: &str) -> Option<&AvailableTable> {
        self.tables.iter().find(|t| t.table_type.id == table_type_id)
    }

    /// Active types a party of `party_size` fits, free or not
    pub fn eligible(&self, party_size: u32) -> impl Iterator<Item = &AvailableTable> {
        self.tables
            .iter()
            .filter(move |t| t.table_type.fits(party_size))
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Whether a seated entry still holds a table of `table_type` at `now`
pub fn is_occupying(entry: &WaitlistEntry, table_type: &TableType, now: i64) -> bool {
    if entry.status != WaitlistStatus::Seated || entry.table_released_at.is_some() {
        return false;
    }
    entry
        .seated_at
        .is_some_and(|seated_at| now < seated_at + minutes_to_millis(effective_turnover(table_type)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waitlist::test_support::{seated_entry, table_type};

    const MIN: i64 = shared::util::MINUTE_MILLIS;

    #[test]
    fn test_counts_occupied_until_turnover() {
        let types = vec![table_type("t4", 4, 2, 60)];
        let seated = vec![
            seated_entry("a", "t4", 0, None),
            seated_entry("b", "t4", 10 * MIN, None),
        ];

        let at_30 = TableAvailability::derive(&types, &seated, 30 * MIN);
        assert_eq!(at_30.get("t4").unwrap().occupied, 2);
        assert_eq!(at_30.get("t4").unwrap().available_count, 0);

        // first party's turnover elapsed
        let at_65 = TableAvailability::derive(&types, &seated, 65 * MIN);
        assert_eq!(at_65.get("t4").unwrap().available_count, 1);
    }

    #[test]
    fn test_released_table_is_free() {
        let types = vec![table_type("t2", 2, 1, 0)];
        let seated = vec![seated_entry("a", "t2", 0, Some(5 * MIN))];
        let snapshot = TableAvailability::derive(&types, &seated, 10 * MIN);
        assert_eq!(snapshot.get("t2").unwrap().available_count, 1);
    }

    #[test]
    fn test_zero_turnover_uses_default() {
        let types = vec![table_type("t2", 2, 1, 0)];
        let seated = vec![seated_entry("a", "t2", 0, None)];
        assert_eq!(
            TableAvailability::derive(&types, &seated, 44 * MIN)
                .get("t2")
                .unwrap()
                .available_count,
            0
        );
        assert_eq!(
            TableAvailability::derive(&types, &seated, 45 * MIN)
                .get("t2")
                .unwrap()
                .available_count,
            1
        );
    }

    #[test]
    fn test_inactive_types_skipped_and_overbooking_saturates() {
        let mut inactive = table_type("t6", 6, 1, 60);
        inactive.is_active = false;
        let types = vec![table_type("t2", 2, 1, 60), inactive];
        let seated = vec![
            seated_entry("a", "t2", 0, None),
            seated_entry("b", "t2", 0, None),
        ];
        let snapshot = TableAvailability::derive(&types, &seated, MIN);
        assert_eq!(snapshot.tables().len(), 1);
        assert_eq!(snapshot.get("t2").unwrap().occupied, 2);
        assert_eq!(snapshot.get("t2").unwrap().available_count, 0);
        assert!(snapshot.get("t6").is_none());
    }
}
