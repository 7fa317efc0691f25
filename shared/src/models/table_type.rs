//! Table Type Model

use serde::{Deserialize, Serialize};

/// Table type entity (桌型：同容量、同翻台时间的一组物理桌台)
///
/// `capacity` and `count` are maintained by restaurant staff; the engine only reads them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableType {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    /// Seats per table
    pub capacity: u32,
    /// Number of physical tables of this type
    pub count: u32,
    /// Minutes a party typically occupies a table of this type
    pub estimated_turnover_time: u32,
    pub is_active: bool,
}

impl TableType {
    /// Whether a party of `party_size` fits at one table of this type
    pub fn fits(&self, party_size: u32) -> bool {
        self.is_active && self.capacity >= party_size
    }
}
