//! 外部协作者 (Collaborators)
//!
//! - [`NotificationSender`] - 通知投递 (fire-and-forget)
//! - [`SeatingAnalytics`] - 入座记录单向上报
//! - [`HistoricalSignalSource`] - 历史信号只读来源

pub mod analytics;
pub mod notification;

pub use analytics::{
    HistoricalSignalSource, InMemoryAnalytics, NoHistory, SeatingAnalytics, SeatingRecord,
};
pub use notification::{LogNotifier, Notification, NotificationSender};

use thiserror::Error;

/// Collaborator failure, logged and never surfaced to callers
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}
