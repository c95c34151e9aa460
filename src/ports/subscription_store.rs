//! Subscription store port.
//!
//! Durable record of subscriptions. Records are never physically deleted;
//! terminal records remain as history.
//!
//! # Contract
//!
//! - At most one Active record per user. The manager guarantees this for
//!   writes it performs; durable implementations should back it with a
//!   unique constraint as well.
//! - `save` is an upsert keyed by subscription id.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::subscription::Subscription;

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// The user's Active record, if any. Does not look at the end date.
    async fn find_active_by_user(&self, user_id: &UserId)
        -> Result<Option<Subscription>, DomainError>;

    /// Active records whose end date is strictly before `cutoff`,
    /// ordered by end date ascending.
    async fn find_all_active_with_end_date_before(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<Subscription>, DomainError>;

    /// Active records with `from <= end_date <= to`, ordered by end date
    /// ascending.
    async fn find_all_active_with_end_date_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Subscription>, DomainError>;

    /// Every record the user ever held, newest first.
    async fn find_all_by_user(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError>;

    /// Insert or update a record by id.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the write would leave two Active records for one user
    /// - `DatabaseError` on persistence failure
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Write a superseded record and its replacement as one unit: either
    /// both land or neither does.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the user would be left with two Active records
    /// - `DatabaseError` on persistence failure
    async fn replace_active(
        &self,
        previous: &Subscription,
        next: &Subscription,
    ) -> Result<(), DomainError>;
}
