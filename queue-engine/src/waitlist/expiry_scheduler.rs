//! 远程排队超时调度器
//!
//! 启动时立即扫描一次，之后按 `EXPIRY_SCAN_INTERVAL_SECS` 周期扫描所有餐厅，
//! 取消超过宽限期仍未到店的远程排队。

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::remote::RemoteCheckInHandler;

/// 超时调度器
///
/// 注册为 `TaskKind::Periodic`，在 `start_background_tasks()` 中启动。
pub struct ExpiryScheduler {
    handler: RemoteCheckInHandler,
    interval: Duration,
    shutdown: CancellationToken,
}

impl ExpiryScheduler {
    pub fn new(handler: RemoteCheckInHandler, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            handler,
            interval,
            shutdown,
        }
    }

    /// 主循环：首次扫描 → 周期扫描，直到 shutdown
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Expiry scheduler started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    break;
                }
                _ = ticker.tick() => {
                    self.sweep().await;
                }
            }
        }

        tracing::info!("Expiry scheduler stopped");
    }

    async fn sweep(&self) {
        let cancelled = self.handler.expire_all().await;
        if cancelled > 0 {
            tracing::info!(cancelled, "Expiry sweep cancelled overdue remote entries");
        } else {
            tracing::debug!("Expiry sweep found nothing overdue");
        }
    }
}
