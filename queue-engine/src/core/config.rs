use crate::waitlist::AllocationStrategy;
use chrono_tz::Tz;
use std::time::Duration;

/// 引擎配置 - 排队引擎的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/queue-engine | 工作目录 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (none) | 日志目录，存在时按天滚动写文件 |
/// | BUSINESS_TIMEZONE | Europe/Madrid | 餐厅未配置时区时使用 |
/// | EXPIRY_SCAN_INTERVAL_SECS | 60 | 远程排队过期扫描间隔(秒) |
/// | LOCK_TIMEOUT_MS | 5000 | 餐厅队列锁等待上限(毫秒) |
/// | ALLOCATION_STRATEGY | best_fit | first_fit / best_fit / optimize_turnover |
/// | REMOTE_GRACE_MINUTES | 15 | 远程到店宽限期(分钟) |
/// | DEFAULT_ARRIVAL_MINUTES | 30 | 确认时未给到店时间的默认值(分钟) |
/// | HISTORY_WINDOW_DAYS | 28 | 历史信号统计窗口(天) |
///
/// # 示例
///
/// ```ignore
/// LOG_LEVEL=debug ALLOCATION_STRATEGY=optimize_turnover cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 日志级别
    pub log_level: String,
    /// 日志目录
    pub log_dir: Option<String>,
    /// 业务时区
    pub business_timezone: Tz,
    /// 过期扫描间隔 (秒)
    pub expiry_scan_interval_secs: u64,
    /// 锁等待上限 (毫秒)
    pub lock_timeout_ms: u64,
    /// 默认分桌策略
    pub allocation_strategy: AllocationStrategy,
    /// 远程到店宽限期 (分钟)
    pub remote_grace_minutes: u32,
    /// 默认到店时间 (分钟)
    pub default_arrival_minutes: u32,
    /// 历史信号窗口 (天)
    pub history_window_days: u32,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        let business_timezone = std::env::var("BUSINESS_TIMEZONE")
            .ok()
            .and_then(|name| match name.parse::<Tz>() {
                Ok(tz) => Some(tz),
                Err(e) => {
                    tracing::warn!(timezone = %name, error = %e, "Invalid BUSINESS_TIMEZONE, using default");
                    None
                }
            })
            .unwrap_or(chrono_tz::Europe::Madrid);

        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/queue-engine".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            business_timezone,
            expiry_scan_interval_secs: env_or("EXPIRY_SCAN_INTERVAL_SECS", 60),
            lock_timeout_ms: env_or("LOCK_TIMEOUT_MS", 5000),
            allocation_strategy: env_or("ALLOCATION_STRATEGY", AllocationStrategy::default()),
            remote_grace_minutes: env_or("REMOTE_GRACE_MINUTES", 15),
            default_arrival_minutes: env_or("DEFAULT_ARRIVAL_MINUTES", 30),
            history_window_days: env_or("HISTORY_WINDOW_DAYS", 28),
        }
    }

    /// 锁等待上限
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// 过期扫描间隔 (最小 1 秒)
    pub fn expiry_scan_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_scan_interval_secs.max(1))
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        // SAFETY: test-local variable name, not read by any other test
        unsafe { std::env::set_var("QUEUE_ENGINE_TEST_NUMBER", "not-a-number") };
        assert_eq!(env_or("QUEUE_ENGINE_TEST_NUMBER", 7u32), 7);
        unsafe { std::env::set_var("QUEUE_ENGINE_TEST_NUMBER", "12") };
        assert_eq!(env_or("QUEUE_ENGINE_TEST_NUMBER", 7u32), 12);
    }

    #[test]
    fn test_durations() {
        let mut config = Config::from_env();
        config.expiry_scan_interval_secs = 0;
        config.lock_timeout_ms = 250;
        assert_eq!(config.expiry_scan_interval(), Duration::from_secs(1));
        assert_eq!(config.lock_timeout(), Duration::from_millis(250));
    }
}
