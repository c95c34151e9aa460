//! Notification channel port.
//!
//! Fire-and-forget delivery of subscription lifecycle events to users
//! (email, in-app). Callers treat failures as non-fatal.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::subscription::SubscriptionEvent;

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Deliver one event.
    ///
    /// # Errors
    ///
    /// - `NotificationError` if delivery failed
    async fn notify(&self, event: SubscriptionEvent) -> Result<(), DomainError>;
}
