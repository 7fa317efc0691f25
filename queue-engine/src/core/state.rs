use std::sync::Arc;

use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::Config;
use crate::db::{MemoryStore, WaitlistStore};
use crate::services::{InMemoryAnalytics, LogNotifier};
use crate::utils::{Clock, SystemClock};
use crate::waitlist::{
    CapacityPredictor, ExpiryScheduler, QueueManager, QueueSettings, RemoteCheckInHandler,
};

/// 引擎状态 - 持有所有组件的共享引用
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | store | Arc<dyn WaitlistStore> | 记录存储 |
/// | analytics | Arc<InMemoryAnalytics> | 入座记录与历史信号 |
/// | manager | Arc<QueueManager> | 排队核心 |
/// | remote | RemoteCheckInHandler | 远程排队 |
/// | predictor | CapacityPredictor | 容量预测 |
///
/// Clone 只复制 Arc。
#[derive(Clone, Debug)]
pub struct EngineState {
    pub config: Config,
    pub store: Arc<dyn WaitlistStore>,
    pub analytics: Arc<InMemoryAnalytics>,
    pub manager: Arc<QueueManager>,
    pub remote: RemoteCheckInHandler,
    pub predictor: CapacityPredictor,
}

impl EngineState {
    /// 使用内存存储和系统时钟初始化
    pub fn initialize(config: &Config) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()), Arc::new(SystemClock))
    }

    /// 使用外部存储和时钟初始化
    pub fn with_store(config: &Config, store: Arc<dyn WaitlistStore>, clock: Arc<dyn Clock>) -> Self {
        let analytics = Arc::new(InMemoryAnalytics::new(
            clock.clone(),
            config.business_timezone,
            config.history_window_days,
        ));

        let manager = Arc::new(QueueManager::new(
            store.clone(),
            clock,
            QueueSettings::from_config(config),
        ));
        manager.set_notifier(Arc::new(LogNotifier));
        manager.set_analytics(analytics.clone());
        manager.set_signal_source(analytics.clone());

        tracing::info!(
            strategy = %config.allocation_strategy,
            timezone = %config.business_timezone,
            "Engine state initialized"
        );

        Self {
            config: config.clone(),
            store,
            analytics,
            remote: RemoteCheckInHandler::new(manager.clone()),
            predictor: CapacityPredictor::new(manager.clone()),
            manager,
        }
    }

    /// 注册后台任务
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let scheduler = ExpiryScheduler::new(
            self.remote.clone(),
            self.config.expiry_scan_interval(),
            tasks.shutdown_token(),
        );
        tasks.spawn("expiry_scheduler", TaskKind::Periodic, scheduler.run());
    }
}
