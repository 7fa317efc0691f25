//! 时间工具：可注入时钟与业务时区转换
//!
//! 引擎内部所有时间戳统一为 `i64` Unix millis。

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Weekday};
use chrono_tz::Tz;
use shared::Restaurant;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use super::{AppError, AppResult};

/// Source of "now" (Unix millis)
pub trait Clock: Send + Sync + fmt::Debug {
    fn now_millis(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        shared::util::now_millis()
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    pub fn advance_minutes(&self, minutes: i64) {
        self.now
            .fetch_add(minutes * shared::util::MINUTE_MILLIS, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// 解析时区名 (IANA)
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| AppError::validation(format!("Invalid timezone: {}", name)))
}

/// 餐厅时区，未配置或无法解析时使用业务默认时区
pub fn restaurant_tz(restaurant: &Restaurant, fallback: Tz) -> Tz {
    match restaurant.timezone.as_deref() {
        None => fallback,
        Some(name) => parse_timezone(name).unwrap_or_else(|e| {
            tracing::warn!(restaurant_id = %restaurant.id, error = %e, "Falling back to business timezone");
            fallback
        }),
    }
}

/// Unix millis → (本地小时, 星期)
pub fn local_hour_weekday(millis: i64, tz: Tz) -> (u32, Weekday) {
    let utc = DateTime::from_timestamp_millis(millis).unwrap_or_default();
    let local = utc.with_timezone(&tz);
    (local.hour(), local.weekday())
}

/// Unix millis → 本地日期
pub fn local_date(millis: i64, tz: Tz) -> NaiveDate {
    DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .with_timezone(&tz)
        .date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000);
        clock.advance_minutes(2);
        assert_eq!(clock.now_millis(), 121_000);
        clock.set(5);
        assert_eq!(clock.now_millis(), 5);
    }

    #[test]
    fn test_local_hour_weekday_madrid() {
        // 2026-07-15 18:30 UTC = 20:30 CEST, a Wednesday
        let millis = chrono::Utc
            .with_ymd_and_hms(2026, 7, 15, 18, 30, 0)
            .unwrap()
            .timestamp_millis();
        let (hour, weekday) = local_hour_weekday(millis, chrono_tz::Europe::Madrid);
        assert_eq!(hour, 20);
        assert_eq!(weekday, Weekday::Wed);
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        // 23:30 UTC on the 1st is already the 2nd in Madrid
        let millis = chrono::Utc
            .with_ymd_and_hms(2026, 3, 1, 23, 30, 0)
            .unwrap()
            .timestamp_millis();
        assert_eq!(
            local_date(millis, chrono_tz::Europe::Madrid),
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
        );
    }

    #[test]
    fn test_restaurant_tz_fallback() {
        let mut restaurant = Restaurant {
            id: "r-1".to_string(),
            name: "Casa".to_string(),
            current_wait_status: shared::WaitStatus::Available,
            custom_wait_time: 0,
            use_advanced_queue: false,
            table_capacity: 0,
            timezone: Some("Mars/Olympus".to_string()),
        };
        assert_eq!(
            restaurant_tz(&restaurant, chrono_tz::UTC),
            chrono_tz::UTC
        );
        restaurant.timezone = Some("America/New_York".to_string());
        assert_eq!(
            restaurant_tz(&restaurant, chrono_tz::UTC),
            chrono_tz::America::New_York
        );
    }
}
