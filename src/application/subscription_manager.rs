//! SubscriptionManager - the subscription state machine service.
//!
//! Owns every write to subscription records. All mutations of one user's
//! subscription run under that user's async lock, so create, extend,
//! cancel and the expiry sweep never interleave for the same user.
//!
//! Reads (`is_active`, `current`) are evaluated live against the clock
//! and never write; a record whose end date has passed reads as inactive
//! even before the sweep marks it Expired.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::{DomainError, SubscriptionId, UserId};
use crate::domain::subscription::{
    CancelReason, Subscription, SubscriptionError, SubscriptionEvent, SubscriptionType,
    MAX_DURATION_MONTHS,
};
use crate::ports::{Clock, NotificationChannel, SubscriptionChecker, SubscriptionStore};

pub struct SubscriptionManager {
    store: Arc<dyn SubscriptionStore>,
    notifier: Arc<dyn NotificationChannel>,
    clock: Arc<dyn Clock>,
    user_locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl SubscriptionManager {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        notifier: Arc<dyn NotificationChannel>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            user_locks: DashMap::new(),
        }
    }

    /// Open a new Active subscription of `duration_months` calendar months.
    ///
    /// An existing Active record is superseded first: Cancelled, or Expired
    /// if its window already closed.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if `duration_months` is 0 or too large; nothing
    ///   is changed in that case
    /// - `Infrastructure` on storage failure
    pub async fn create(
        &self,
        user_id: &UserId,
        subscription_type: SubscriptionType,
        duration_months: u32,
    ) -> Result<Subscription, SubscriptionError> {
        if duration_months == 0 || duration_months > MAX_DURATION_MONTHS {
            return Err(SubscriptionError::validation(
                "duration_months",
                format!(
                    "Duration must be between 1 and {} months, got {}",
                    MAX_DURATION_MONTHS, duration_months
                ),
            ));
        }

        let _guard = self.lock_user(user_id).await;
        let now = self.clock.now();
        let mut events = Vec::with_capacity(2);

        let subscription = Subscription::start(
            SubscriptionId::new(),
            user_id.clone(),
            subscription_type,
            duration_months,
            now,
        )?;

        match self.store.find_active_by_user(user_id).await? {
            Some(mut previous) => {
                if previous.is_overdue_at(now) {
                    previous.expire(now)?;
                    events.push(SubscriptionEvent::expired(&previous, now));
                } else {
                    previous.cancel(now)?;
                    events.push(SubscriptionEvent::cancelled(
                        &previous,
                        CancelReason::Superseded,
                        now,
                    ));
                }
                self.store.replace_active(&previous, &subscription).await?;
                tracing::info!(
                    user_id = %user_id,
                    subscription_id = %previous.id,
                    status = %previous.status,
                    "Superseded previous subscription"
                );
            }
            None => self.store.save(&subscription).await?,
        }
        events.push(SubscriptionEvent::created(&subscription, now));

        tracing::info!(
            user_id = %user_id,
            subscription_id = %subscription.id,
            subscription_type = %subscription_type,
            end_date = %subscription.end_date,
            "Subscription created"
        );

        for event in events {
            self.notify(event).await;
        }
        Ok(subscription)
    }

    /// `create` with the plan's natural duration.
    pub async fn subscribe(
        &self,
        user_id: &UserId,
        subscription_type: SubscriptionType,
    ) -> Result<Subscription, SubscriptionError> {
        self.create(user_id, subscription_type, subscription_type.duration_months())
            .await
    }

    /// Add one term of `subscription_type` to the user's Active record.
    ///
    /// The new end date is `max(now, end_date) + months`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user has no Active record
    /// - `Infrastructure` on storage failure
    pub async fn extend(
        &self,
        user_id: &UserId,
        subscription_type: SubscriptionType,
    ) -> Result<Subscription, SubscriptionError> {
        let _guard = self.lock_user(user_id).await;
        let now = self.clock.now();

        let mut subscription = self
            .store
            .find_active_by_user(user_id)
            .await?
            .ok_or_else(|| SubscriptionError::not_found(user_id.clone()))?;

        let previous_end = subscription.extend(subscription_type.duration_months(), now)?;
        self.store.save(&subscription).await?;

        tracing::info!(
            user_id = %user_id,
            subscription_id = %subscription.id,
            previous_end_date = %previous_end,
            new_end_date = %subscription.end_date,
            "Subscription extended"
        );

        self.notify(SubscriptionEvent::extended(&subscription, previous_end, now))
            .await;
        Ok(subscription)
    }

    /// Cancel the user's Active record immediately.
    ///
    /// Returns `None` (and changes nothing) when there is no Active record.
    pub async fn cancel(&self, user_id: &UserId) -> Result<Option<Subscription>, SubscriptionError> {
        let _guard = self.lock_user(user_id).await;
        let now = self.clock.now();

        let Some(mut subscription) = self.store.find_active_by_user(user_id).await? else {
            tracing::debug!(user_id = %user_id, "Cancel requested without active subscription");
            return Ok(None);
        };

        subscription.cancel(now)?;
        self.store.save(&subscription).await?;

        tracing::info!(
            user_id = %user_id,
            subscription_id = %subscription.id,
            "Subscription cancelled"
        );

        self.notify(SubscriptionEvent::cancelled(
            &subscription,
            CancelReason::Requested,
            now,
        ))
        .await;
        Ok(Some(subscription))
    }

    /// True when the user's Active record covers the current instant.
    pub async fn is_active(&self, user_id: &UserId) -> Result<bool, SubscriptionError> {
        Ok(self.current(user_id).await?.is_some())
    }

    /// The user's live subscription, if any.
    pub async fn current(&self, user_id: &UserId) -> Result<Option<Subscription>, SubscriptionError> {
        let now = self.clock.now();
        Ok(self
            .store
            .find_active_by_user(user_id)
            .await?
            .filter(|s| s.is_active_at(now)))
    }

    /// Every record the user has held, newest first.
    pub async fn history(&self, user_id: &UserId) -> Result<Vec<Subscription>, SubscriptionError> {
        Ok(self.store.find_all_by_user(user_id).await?)
    }

    /// Turn automatic renewal on or off for the user's Active record.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user has no Active record
    pub async fn set_auto_renewal(
        &self,
        user_id: &UserId,
        enabled: bool,
    ) -> Result<Subscription, SubscriptionError> {
        let _guard = self.lock_user(user_id).await;
        let now = self.clock.now();

        let mut subscription = self
            .store
            .find_active_by_user(user_id)
            .await?
            .ok_or_else(|| SubscriptionError::not_found(user_id.clone()))?;

        subscription.set_auto_renewal(enabled, now)?;
        self.store.save(&subscription).await?;

        tracing::info!(
            user_id = %user_id,
            subscription_id = %subscription.id,
            enabled,
            "Auto-renewal updated"
        );
        Ok(subscription)
    }

    /// Active records whose end date has passed, oldest first.
    pub async fn get_expired(&self) -> Result<Vec<Subscription>, SubscriptionError> {
        let now = self.clock.now();
        Ok(self.store.find_all_active_with_end_date_before(now).await?)
    }

    /// Live records ending within `window` from now, soonest first.
    pub async fn get_expiring_within(
        &self,
        window: chrono::Duration,
    ) -> Result<Vec<Subscription>, SubscriptionError> {
        let now = self.clock.now();
        Ok(self
            .store
            .find_all_active_with_end_date_between(now, now.plus(window))
            .await?)
    }

    /// Mark every overdue Active record Expired. Returns how many changed.
    ///
    /// Each candidate is re-read under its user's lock; a record that was
    /// extended or replaced since the batch was fetched is left alone.
    pub async fn reconcile_expired(&self) -> Result<usize, SubscriptionError> {
        let candidates = self.get_expired().await?;
        let mut expired = 0;

        for candidate in candidates {
            let _guard = self.lock_user(&candidate.user_id).await;
            let now = self.clock.now();

            let current = self.store.find_active_by_user(&candidate.user_id).await?;
            let Some(mut subscription) = current.filter(|s| s.id == candidate.id) else {
                continue;
            };
            if !subscription.is_overdue_at(now) {
                tracing::debug!(
                    subscription_id = %subscription.id,
                    "Skipping subscription renewed since sweep started"
                );
                continue;
            }

            subscription.expire(now)?;
            self.store.save(&subscription).await?;
            expired += 1;

            tracing::info!(
                user_id = %subscription.user_id,
                subscription_id = %subscription.id,
                end_date = %subscription.end_date,
                "Subscription expired"
            );
            self.notify(SubscriptionEvent::expired(&subscription, now)).await;
        }

        let pruned = self.prune_idle_locks();
        if pruned > 0 {
            tracing::debug!(pruned, "Dropped idle user locks");
        }
        Ok(expired)
    }

    /// Drop lock entries nobody holds or waits on. Returns how many went.
    ///
    /// `lock_user` clones the entry's `Arc` while holding the map shard, so
    /// a count of one means no caller can be between lookup and lock.
    pub fn prune_idle_locks(&self) -> usize {
        let before = self.user_locks.len();
        self.user_locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before.saturating_sub(self.user_locks.len())
    }

    async fn lock_user(&self, user_id: &UserId) -> OwnedMutexGuard<()> {
        let lock = self
            .user_locks
            .entry(user_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    async fn notify(&self, event: SubscriptionEvent) {
        let event_type = event.event_type();
        let user_id = event.user_id().clone();
        if let Err(e) = self.notifier.notify(event).await {
            tracing::warn!(
                event_type,
                user_id = %user_id,
                error = %e,
                "Failed to deliver subscription notification"
            );
        }
    }
}

#[async_trait]
impl SubscriptionChecker for SubscriptionManager {
    async fn is_active(&self, user_id: &UserId) -> Result<bool, DomainError> {
        SubscriptionManager::is_active(self, user_id)
            .await
            .map_err(DomainError::from)
    }
}
