/// Milliseconds in one minute
pub const MINUTE_MILLIS: i64 = 60_000;

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Minutes → millis, for offsetting Unix-millis timestamps
pub fn minutes_to_millis(minutes: u32) -> i64 {
    i64::from(minutes) * MINUTE_MILLIS
}

/// Whole minutes between two Unix-millis timestamps (rounded down, never negative)
pub fn elapsed_minutes(from: i64, to: i64) -> u32 {
    let minutes = (to - from).max(0) / MINUTE_MILLIS;
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_to_millis() {
        assert_eq!(minutes_to_millis(15), 900_000);
    }

    #[test]
    fn test_elapsed_minutes() {
        assert_eq!(elapsed_minutes(0, 90_000), 1);
        assert_eq!(elapsed_minutes(90_000, 0), 0);
    }
}
