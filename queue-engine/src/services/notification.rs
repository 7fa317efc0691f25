use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::CollaboratorError;

/// Message handed to the delivery collaborator when an entry is notified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub phone_number: Option<String>,
    pub message: String,
}

impl Notification {
    /// "table ready" message for a party
    pub fn table_ready(customer_name: &str, phone_number: Option<String>) -> Self {
        Self {
            phone_number,
            message: format!("Hi {}, your table is ready. Please come to the host stand.", customer_name),
        }
    }
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), CollaboratorError>;
}

/// Writes notifications to the log instead of delivering them
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSender for LogNotifier {
    async fn send(&self, notification: Notification) -> Result<(), CollaboratorError> {
        match notification.phone_number.as_deref() {
            Some(phone) => {
                tracing::info!(phone = %phone, message = %notification.message, "Notification queued")
            }
            None => tracing::debug!(message = %notification.message, "Notification without phone, skipped"),
        }
        Ok(())
    }
}
