//! Notification channel that writes events to the log.
//!
//! Stand-in for email/in-app delivery until a real provider is wired.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::subscription::SubscriptionEvent;
use crate::ports::NotificationChannel;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationChannel;

#[async_trait]
impl NotificationChannel for TracingNotificationChannel {
    async fn notify(&self, event: SubscriptionEvent) -> Result<(), DomainError> {
        tracing::info!(
            event_type = event.event_type(),
            user_id = %event.user_id(),
            subscription_id = %event.subscription_id(),
            "Subscription notification"
        );
        Ok(())
    }
}
