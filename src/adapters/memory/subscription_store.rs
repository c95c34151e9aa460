//! In-memory subscription store.
//!
//! Used when no database is configured and by tests. Enforces the
//! one-Active-per-user rule the same way the Postgres unique index does.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{Subscription, SubscriptionStatus};
use crate::ports::SubscriptionStore;

/// Subscription store backed by a `HashMap`.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(InMemorySubscriptionStore::new());
/// store.save(&subscription).await?;
/// assert_eq!(store.len().await, 1);
/// ```
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    records: RwLock<HashMap<SubscriptionId, Subscription>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed records directly, bypassing the Active uniqueness check.
    pub async fn with_records(records: impl IntoIterator<Item = Subscription>) -> Self {
        let store = Self::new();
        {
            let mut map = store.records.write().await;
            for sub in records {
                map.insert(sub.id, sub);
            }
        }
        store
    }

    // === Test Helpers ===

    /// Make every read return a database error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write return a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Number of Active records for `user_id`, ignoring end dates.
    pub async fn active_count(&self, user_id: &UserId) -> usize {
        self.records
            .read()
            .await
            .values()
            .filter(|s| &s.user_id == user_id && s.status == SubscriptionStatus::Active)
            .count()
    }

    fn check_reads(&self) -> Result<(), DomainError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::database("in-memory store: reads disabled"));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("in-memory store: writes disabled"));
        }
        Ok(())
    }

    fn conflict(user_id: &UserId) -> DomainError {
        DomainError::new(
            ErrorCode::Conflict,
            format!("User {} already has an active subscription", user_id),
        )
    }

    /// Fails if the subscription's user holds an Active record outside `ignoring`.
    fn ensure_no_other_active(
        map: &HashMap<SubscriptionId, Subscription>,
        subscription: &Subscription,
        ignoring: &[SubscriptionId],
    ) -> Result<(), DomainError> {
        let clash = map.values().any(|s| {
            !ignoring.contains(&s.id)
                && s.user_id == subscription.user_id
                && s.status == SubscriptionStatus::Active
        });
        if clash {
            return Err(Self::conflict(&subscription.user_id));
        }
        Ok(())
    }

    fn active_sorted_by_end<F>(map: &HashMap<SubscriptionId, Subscription>, keep: F) -> Vec<Subscription>
    where
        F: Fn(&Subscription) -> bool,
    {
        let mut out: Vec<Subscription> = map
            .values()
            .filter(|s| s.status == SubscriptionStatus::Active && keep(s))
            .cloned()
            .collect();
        out.sort_by_key(|s| s.end_date);
        out
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn find_active_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        self.check_reads()?;
        let map = self.records.read().await;
        Ok(map
            .values()
            .find(|s| &s.user_id == user_id && s.status == SubscriptionStatus::Active)
            .cloned())
    }

    async fn find_all_active_with_end_date_before(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<Subscription>, DomainError> {
        self.check_reads()?;
        let map = self.records.read().await;
        Ok(Self::active_sorted_by_end(&map, |s| s.end_date < cutoff))
    }

    async fn find_all_active_with_end_date_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Subscription>, DomainError> {
        self.check_reads()?;
        let map = self.records.read().await;
        Ok(Self::active_sorted_by_end(&map, |s| {
            s.end_date >= from && s.end_date <= to
        }))
    }

    async fn find_all_by_user(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError> {
        self.check_reads()?;
        let map = self.records.read().await;
        let mut out: Vec<Subscription> = map
            .values()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        self.check_writes()?;
        let mut map = self.records.write().await;

        if subscription.status == SubscriptionStatus::Active {
            Self::ensure_no_other_active(&map, subscription, &[subscription.id])?;
        }

        map.insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn replace_active(
        &self,
        previous: &Subscription,
        next: &Subscription,
    ) -> Result<(), DomainError> {
        self.check_writes()?;
        let mut map = self.records.write().await;

        if previous.status == SubscriptionStatus::Active && previous.user_id == next.user_id {
            return Err(Self::conflict(&next.user_id));
        }
        if next.status == SubscriptionStatus::Active {
            Self::ensure_no_other_active(&map, next, &[previous.id, next.id])?;
        }

        map.insert(previous.id, previous.clone());
        map.insert(next.id, next.clone());
        Ok(())
    }
}
