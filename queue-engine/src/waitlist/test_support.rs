//! Builders shared by the waitlist unit tests

use shared::{Restaurant, TableType, WaitStatus, WaitlistEntry, WaitlistStatus};

pub fn table_type(id: &str, capacity: u32, count: u32, turnover: u32) -> TableType {
    TableType {
        id: id.to_string(),
        restaurant_id: "r-1".to_string(),
        name: format!("{}-top", capacity),
        capacity,
        count,
        estimated_turnover_time: turnover,
        is_active: true,
    }
}

pub fn restaurant(use_advanced_queue: bool) -> Restaurant {
    Restaurant {
        id: "r-1".to_string(),
        name: "Casa Lola".to_string(),
        current_wait_status: WaitStatus::Available,
        custom_wait_time: 0,
        use_advanced_queue,
        table_capacity: 40,
        timezone: None,
    }
}

pub fn entry(id: &str, position: u32, party_size: u32, status: WaitlistStatus) -> WaitlistEntry {
    WaitlistEntry {
        id: id.to_string(),
        restaurant_id: "r-1".to_string(),
        customer_name: format!("Guest {}", id),
        party_size,
        phone_number: None,
        email: None,
        notes: None,
        dietary_requirements: vec![],
        status,
        queue_position: position,
        estimated_wait_time: 0,
        table_type_id: None,
        is_remote: false,
        confirmation_code: None,
        expected_arrival_time: None,
        arrived_at: None,
        created_at: i64::from(position),
        notified_at: None,
        seated_at: None,
        cancelled_at: None,
        table_released_at: None,
        version: 0,
    }
}

pub fn seated_entry(
    id: &str,
    table_type_id: &str,
    seated_at: i64,
    released_at: Option<i64>,
) -> WaitlistEntry {
    WaitlistEntry {
        table_type_id: Some(table_type_id.to_string()),
        seated_at: Some(seated_at),
        table_released_at: released_at,
        ..entry(id, 1, 2, WaitlistStatus::Seated)
    }
}
