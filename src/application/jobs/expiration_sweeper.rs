//! ExpirationSweeper - moves overdue subscriptions to Expired.
//!
//! Runs independently of requests. Access checks never wait for it: they
//! evaluate the end date live. The sweep only brings the stored status in
//! line and emits the `Expired` notifications.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::SubscriptionManager;
use crate::domain::foundation::DomainError;
use crate::domain::subscription::SubscriptionError;

use super::{PeriodicJob, RunGuard, RunOutcome};

pub struct ExpirationSweeper {
    manager: Arc<SubscriptionManager>,
    guard: RunGuard,
}

impl ExpirationSweeper {
    pub fn new(manager: Arc<SubscriptionManager>) -> Self {
        Self {
            manager,
            guard: RunGuard::new(),
        }
    }

    /// One sweep. Returns `Skipped` if a sweep is already in progress.
    pub async fn sweep(&self) -> Result<RunOutcome, SubscriptionError> {
        let Some(_permit) = self.guard.try_acquire() else {
            return Ok(RunOutcome::Skipped);
        };

        let overdue = self.manager.get_expired().await?;
        if overdue.is_empty() {
            tracing::debug!("No expired subscriptions");
            return Ok(RunOutcome::Completed(0));
        }

        let expired = self.manager.reconcile_expired().await?;
        tracing::info!(found = overdue.len(), expired, "Expiration sweep completed");
        Ok(RunOutcome::Completed(expired))
    }
}

#[async_trait]
impl PeriodicJob for ExpirationSweeper {
    fn name(&self) -> &'static str {
        "expiration_sweep"
    }

    async fn run(&self) -> Result<RunOutcome, DomainError> {
        self.sweep().await.map_err(DomainError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryNotificationChannel, InMemorySubscriptionStore, ManualClock};
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::subscription::SubscriptionType;

    fn setup() -> (ExpirationSweeper, Arc<SubscriptionManager>, Arc<InMemorySubscriptionStore>, Arc<ManualClock>) {
        let store = Arc::new(InMemorySubscriptionStore::new());
        let clock = Arc::new(ManualClock::new(
            Timestamp::from_unix_secs(1_700_000_000).unwrap(),
        ));
        let manager = Arc::new(SubscriptionManager::new(
            store.clone(),
            Arc::new(InMemoryNotificationChannel::new()),
            clock.clone(),
        ));
        (ExpirationSweeper::new(manager.clone()), manager, store, clock)
    }

    #[tokio::test]
    async fn empty_sweep_completes_with_zero() {
        let (sweeper, _, _, _) = setup();
        assert_eq!(sweeper.sweep().await.unwrap(), RunOutcome::Completed(0));
    }

    #[tokio::test]
    async fn sweep_expires_overdue_batch() {
        let (sweeper, manager, store, clock) = setup();
        for id in ["1", "2", "3"] {
            manager
                .subscribe(&UserId::new(id).unwrap(), SubscriptionType::Monthly)
                .await
                .unwrap();
        }

        clock.advance_days(40);
        assert_eq!(sweeper.sweep().await.unwrap(), RunOutcome::Completed(3));
        assert_eq!(store.active_count(&UserId::new("1").unwrap()).await, 0);
    }

    #[tokio::test]
    async fn overlapping_sweep_is_skipped() {
        let (sweeper, _, _, _) = setup();
        let _held = sweeper.guard.try_acquire();
        assert_eq!(sweeper.sweep().await.unwrap(), RunOutcome::Skipped);
    }

    #[tokio::test]
    async fn storage_failure_surfaces_as_error() {
        let (sweeper, _, store, _) = setup();
        store.fail_reads(true);
        assert!(sweeper.run().await.is_err());
        // guard released after failure
        store.fail_reads(false);
        assert!(sweeper.run().await.is_ok());
    }
}
