//! Subscription checker port.
//!
//! The narrow read the access guard needs from the subscription side.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};

#[async_trait]
pub trait SubscriptionChecker: Send + Sync {
    /// True when the user holds an Active subscription whose window covers
    /// the current instant. Never writes.
    async fn is_active(&self, user_id: &UserId) -> Result<bool, DomainError>;
}
