//! ExpiryNotifier - warns users whose subscription ends soon.
//!
//! Informational only: never changes subscription state and runs on its
//! own schedule, so its failures do not affect the expiration sweep.
//! Each subscription is notified once per end date; extending the
//! subscription makes it eligible again for the new date.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::application::SubscriptionManager;
use crate::domain::foundation::{DomainError, SubscriptionId, Timestamp};
use crate::domain::subscription::{SubscriptionError, SubscriptionEvent};
use crate::ports::{Clock, NotificationChannel};

use super::{PeriodicJob, RunGuard, RunOutcome};

pub struct ExpiryNotifier {
    manager: Arc<SubscriptionManager>,
    notifier: Arc<dyn NotificationChannel>,
    clock: Arc<dyn Clock>,
    window: chrono::Duration,
    sent: DashMap<SubscriptionId, Timestamp>,
    guard: RunGuard,
}

impl ExpiryNotifier {
    pub fn new(
        manager: Arc<SubscriptionManager>,
        notifier: Arc<dyn NotificationChannel>,
        clock: Arc<dyn Clock>,
        window: chrono::Duration,
    ) -> Self {
        Self {
            manager,
            notifier,
            clock,
            window,
            sent: DashMap::new(),
            guard: RunGuard::new(),
        }
    }

    /// Notify every subscription ending within the window that has not
    /// been notified for its current end date. Returns the number sent.
    pub async fn notify_expiring(&self) -> Result<RunOutcome, SubscriptionError> {
        let Some(_permit) = self.guard.try_acquire() else {
            return Ok(RunOutcome::Skipped);
        };

        let expiring = self.manager.get_expiring_within(self.window).await?;
        let now = self.clock.now();

        let live: HashSet<SubscriptionId> = expiring.iter().map(|s| s.id).collect();
        self.sent.retain(|id, _| live.contains(id));

        let mut delivered = 0;
        for subscription in &expiring {
            let already_sent = self
                .sent
                .get(&subscription.id)
                .map(|end| *end == subscription.end_date)
                .unwrap_or(false);
            if already_sent {
                continue;
            }

            let event = SubscriptionEvent::expiring_soon(subscription, now);
            match self.notifier.notify(event).await {
                Ok(()) => {
                    self.sent.insert(subscription.id, subscription.end_date);
                    delivered += 1;
                }
                Err(e) => tracing::warn!(
                    subscription_id = %subscription.id,
                    error = %e,
                    "Failed to send expiring-soon notice"
                ),
            }
        }

        if delivered > 0 {
            tracing::info!(delivered, "Expiring-soon notices sent");
        }
        Ok(RunOutcome::Completed(delivered))
    }
}

#[async_trait]
impl PeriodicJob for ExpiryNotifier {
    fn name(&self) -> &'static str {
        "expiry_notifier"
    }

    async fn run(&self) -> Result<RunOutcome, DomainError> {
        self.notify_expiring().await.map_err(DomainError::from)
    }
}
