//! Fire-and-forget collaborator calls
//!
//! Collected inside the critical section, dispatched after the guard drops.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::services::{Notification, NotificationSender, SeatingAnalytics, SeatingRecord};

/// Side effect owed to a collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Notify(Notification),
    Seating(SeatingRecord),
}

pub struct OutboundDispatcher {
    notifier: RwLock<Arc<dyn NotificationSender>>,
    analytics: RwLock<Arc<dyn SeatingAnalytics>>,
}

impl std::fmt::Debug for OutboundDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundDispatcher").finish_non_exhaustive()
    }
}

impl OutboundDispatcher {
    pub fn new(notifier: Arc<dyn NotificationSender>, analytics: Arc<dyn SeatingAnalytics>) -> Self {
        Self {
            notifier: RwLock::new(notifier),
            analytics: RwLock::new(analytics),
        }
    }

    pub fn set_notifier(&self, notifier: Arc<dyn NotificationSender>) {
        *self.notifier.write() = notifier;
    }

    pub fn set_analytics(&self, analytics: Arc<dyn SeatingAnalytics>) {
        *self.analytics.write() = analytics;
    }

    /// Spawn one task per item; failures are logged at warn
    pub fn dispatch(&self, items: Vec<Outbound>) {
        for item in items {
            match item {
                Outbound::Notify(notification) => {
                    let notifier = self.notifier.read().clone();
                    tokio::spawn(async move {
                        if let Err(e) = notifier.send(notification).await {
                            tracing::warn!(error = %e, "Notification delivery failed");
                        }
                    });
                }
                Outbound::Seating(record) => {
                    let analytics = self.analytics.read().clone();
                    tokio::spawn(async move {
                        let restaurant_id = record.restaurant_id.clone();
                        if let Err(e) = analytics.record_seating(record).await {
                            tracing::warn!(restaurant_id = %restaurant_id, error = %e, "Seating analytics handoff failed");
                        }
                    });
                }
            }
        }
    }
}
