//! Waitlist Module - 排队与桌型分配
//!
//! # 结构
//!
//! - [`QueueManager`] - 排队生命周期与位置不变量
//! - [`RemoteCheckInHandler`] - 远程排队 (确认码、宽限期、超时)
//! - [`CapacityPredictor`] - 只读容量预测与桌型效率
//! - [`allocator`] / [`estimator`] - 纯函数：桌型选择与等待时间估算
//! - [`ExpiryScheduler`] - 周期性超时扫描

pub mod allocator;
pub mod availability;
pub mod confirmation;
pub mod estimator;
pub mod expiry_scheduler;
pub mod locks;
pub mod manager;
pub mod metrics;
pub mod outbound;
pub mod predictor;
pub mod remote;
pub mod signals;

#[cfg(test)]
pub(crate) mod test_support;

pub use allocator::{AllocationStrategy, TableAssignment};
pub use availability::{AvailableTable, TableAvailability};
pub use estimator::{Confidence, WaitEstimate};
pub use expiry_scheduler::ExpiryScheduler;
pub use manager::{ManagerError, ManagerResult, QueueManager, QueueSettings, TransitionExtra};
pub use metrics::TableEfficiency;
pub use predictor::{CapacityPrediction, CapacityPredictor};
pub use remote::{CheckInResult, RemoteCheckInHandler};
pub use signals::{DailySignal, HistoricalSignals};
