//! Recording notification channel for tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::subscription::SubscriptionEvent;
use crate::ports::NotificationChannel;

/// Captures every delivered event for assertions.
///
/// # Example
///
/// ```ignore
/// let channel = Arc::new(InMemoryNotificationChannel::new());
/// // ... run the operation ...
/// assert_eq!(channel.events_of_type("subscription.created").await.len(), 1);
/// ```
#[derive(Default)]
pub struct InMemoryNotificationChannel {
    delivered: RwLock<Vec<SubscriptionEvent>>,
    failing: AtomicBool,
}

impl InMemoryNotificationChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel whose every delivery fails.
    pub fn failing() -> Self {
        let channel = Self::default();
        channel.failing.store(true, Ordering::SeqCst);
        channel
    }

    pub async fn events(&self) -> Vec<SubscriptionEvent> {
        self.delivered.read().await.clone()
    }

    pub async fn events_of_type(&self, event_type: &str) -> Vec<SubscriptionEvent> {
        self.delivered
            .read()
            .await
            .iter()
            .filter(|e| e.event_type() == event_type)
            .cloned()
            .collect()
    }

    pub async fn clear(&self) {
        self.delivered.write().await.clear();
    }
}

#[async_trait]
impl NotificationChannel for InMemoryNotificationChannel {
    async fn notify(&self, event: SubscriptionEvent) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::NotificationError,
                "notification delivery disabled",
            ));
        }
        self.delivered.write().await.push(event);
        Ok(())
    }
}
