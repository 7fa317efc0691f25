//! 历史信号：高峰时段、繁忙星期与平均桌客人数
//!
//! 由分析协作者按最近 N 天 (默认 28) 的每日汇总行聚合得到，估算器只读使用。

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Peak-hour boost
pub const PEAK_HOUR_MULTIPLIER: f64 = 1.25;
/// Boost on the busiest weekdays
pub const BUSY_DAY_MULTIPLIER: f64 = 1.25;
/// How many weekdays count as "busiest"
const BUSIEST_DAY_COUNT: usize = 2;

/// One day of rolled-up seating history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySignal {
    pub date: NaiveDate,
    /// Local hour (0-23) with the most seatings that day
    pub peak_hour: Option<u32>,
    pub party_count: u32,
    pub average_party_size: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSignals {
    pub peak_hour: Option<u32>,
    pub busiest_days: Vec<Weekday>,
    pub average_party_size: Option<f64>,
}

impl HistoricalSignals {
    /// `hour` within ±1 of the peak hour, wrapping midnight
    pub fn is_peak_hour(&self, hour: u32) -> bool {
        let Some(peak) = self.peak_hour else {
            return false;
        };
        let diff = (i64::from(hour % 24) - i64::from(peak % 24)).rem_euclid(24);
        diff.min(24 - diff) <= 1
    }

    pub fn day_of_week_multiplier(&self, weekday: Weekday) -> f64 {
        if self.busiest_days.contains(&weekday) {
            BUSY_DAY_MULTIPLIER
        } else {
            1.0
        }
    }

    /// `sqrt(party_size / average_party_size)`, 1.0 without a usable average
    pub fn party_size_factor(&self, party_size: u32) -> f64 {
        match self.average_party_size {
            Some(avg) if avg.is_finite() && avg > 0.0 => (f64::from(party_size) / avg).sqrt(),
            _ => 1.0,
        }
    }

    /// Combined multiplier for a party at a local hour and weekday
    pub fn multiplier(&self, party_size: u32, local_hour: u32, weekday: Weekday) -> f64 {
        let peak = if self.is_peak_hour(local_hour) {
            PEAK_HOUR_MULTIPLIER
        } else {
            1.0
        };
        peak * self.day_of_week_multiplier(weekday) * self.party_size_factor(party_size)
    }

    /// Aggregate the daily rows inside `(today - window_days, today]`
    ///
    /// Returns `None` when the window holds no rows.
    pub fn aggregate(daily: &[DailySignal], today: NaiveDate, window_days: u32) -> Option<Self> {
        let window_start = today - chrono::Duration::days(i64::from(window_days));
        let rows: Vec<&DailySignal> = daily
            .iter()
            .filter(|d| d.date > window_start && d.date <= today)
            .collect();
        if rows.is_empty() {
            return None;
        }

        // 出现次数最多的高峰小时，平局取更早的小时
        let mut peak_counts: BTreeMap<u32, u32> = BTreeMap::new();
        for hour in rows.iter().filter_map(|d| d.peak_hour) {
            *peak_counts.entry(hour % 24).or_default() += 1;
        }
        let peak_hour = peak_counts
            .iter()
            .fold(None::<(u32, u32)>, |best, (&hour, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((hour, count)),
            })
            .map(|(hour, _)| hour);

        // 各星期的平均桌数
        let mut per_day: HashMap<Weekday, (u64, u32)> = HashMap::new();
        for d in &rows {
            let slot = per_day.entry(d.date.weekday()).or_default();
            slot.0 += u64::from(d.party_count);
            slot.1 += 1;
        }
        let mut day_means: Vec<(Weekday, f64)> = per_day
            .into_iter()
            .map(|(day, (total, days))| (day, total as f64 / f64::from(days)))
            .collect();
        day_means.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then(a.0.num_days_from_monday().cmp(&b.0.num_days_from_monday()))
        });
        let busiest_days = day_means
            .into_iter()
            .take(BUSIEST_DAY_COUNT)
            .map(|(day, _)| day)
            .collect();

        let (weighted, parties) = rows.iter().fold((0.0, 0u64), |(sum, n), d| {
            (
                sum + d.average_party_size * f64::from(d.party_count),
                n + u64::from(d.party_count),
            )
        });
        let average_party_size = (parties > 0).then(|| weighted / parties as f64);

        Some(Self {
            peak_hour,
            busiest_days,
            average_party_size,
        })
    }
}
