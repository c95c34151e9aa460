//! Subscription domain events.
//!
//! Emitted on every lifecycle change and handed to the notification
//! channel. Delivery (email, in-app) happens outside this crate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SubscriptionId, Timestamp, UserId};

use super::{Subscription, SubscriptionType};

/// Events that occur during the subscription lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubscriptionEvent {
    /// A new Active record was opened.
    Created {
        subscription_id: SubscriptionId,
        user_id: UserId,
        subscription_type: SubscriptionType,
        end_date: Timestamp,
        occurred_at: Timestamp,
    },

    /// An Active record's end date moved forward.
    Extended {
        subscription_id: SubscriptionId,
        user_id: UserId,
        previous_end_date: Timestamp,
        new_end_date: Timestamp,
        occurred_at: Timestamp,
    },

    /// State transition: Active → Cancelled
    Cancelled {
        subscription_id: SubscriptionId,
        user_id: UserId,
        reason: CancelReason,
        occurred_at: Timestamp,
    },

    /// State transition: Active → Expired (sweep only)
    Expired {
        subscription_id: SubscriptionId,
        user_id: UserId,
        end_date: Timestamp,
        occurred_at: Timestamp,
    },

    /// The window closes soon. Informational; no state change.
    ExpiringSoon {
        subscription_id: SubscriptionId,
        user_id: UserId,
        end_date: Timestamp,
        days_remaining: u32,
        occurred_at: Timestamp,
    },
}

/// Why a subscription was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// User or admin asked for it.
    Requested,

    /// Replaced by a newly created subscription.
    Superseded,
}

impl SubscriptionEvent {
    pub fn created(sub: &Subscription, occurred_at: Timestamp) -> Self {
        SubscriptionEvent::Created {
            subscription_id: sub.id,
            user_id: sub.user_id.clone(),
            subscription_type: sub.subscription_type,
            end_date: sub.end_date,
            occurred_at,
        }
    }

    pub fn extended(sub: &Subscription, previous_end_date: Timestamp, occurred_at: Timestamp) -> Self {
        SubscriptionEvent::Extended {
            subscription_id: sub.id,
            user_id: sub.user_id.clone(),
            previous_end_date,
            new_end_date: sub.end_date,
            occurred_at,
        }
    }

    pub fn cancelled(sub: &Subscription, reason: CancelReason, occurred_at: Timestamp) -> Self {
        SubscriptionEvent::Cancelled {
            subscription_id: sub.id,
            user_id: sub.user_id.clone(),
            reason,
            occurred_at,
        }
    }

    pub fn expired(sub: &Subscription, occurred_at: Timestamp) -> Self {
        SubscriptionEvent::Expired {
            subscription_id: sub.id,
            user_id: sub.user_id.clone(),
            end_date: sub.end_date,
            occurred_at,
        }
    }

    pub fn expiring_soon(sub: &Subscription, occurred_at: Timestamp) -> Self {
        SubscriptionEvent::ExpiringSoon {
            subscription_id: sub.id,
            user_id: sub.user_id.clone(),
            end_date: sub.end_date,
            days_remaining: sub.days_remaining(occurred_at),
            occurred_at,
        }
    }

    /// Returns the event type string for routing and filtering.
    pub fn event_type(&self) -> &'static str {
        match self {
            SubscriptionEvent::Created { .. } => "subscription.created",
            SubscriptionEvent::Extended { .. } => "subscription.extended",
            SubscriptionEvent::Cancelled { .. } => "subscription.cancelled",
            SubscriptionEvent::Expired { .. } => "subscription.expired",
            SubscriptionEvent::ExpiringSoon { .. } => "subscription.expiring_soon",
        }
    }

    /// Returns the subscription this event is about.
    pub fn subscription_id(&self) -> &SubscriptionId {
        match self {
            SubscriptionEvent::Created { subscription_id, .. }
            | SubscriptionEvent::Extended { subscription_id, .. }
            | SubscriptionEvent::Cancelled { subscription_id, .. }
            | SubscriptionEvent::Expired { subscription_id, .. }
            | SubscriptionEvent::ExpiringSoon { subscription_id, .. } => subscription_id,
        }
    }

    /// Returns the user this event is about.
    pub fn user_id(&self) -> &UserId {
        match self {
            SubscriptionEvent::Created { user_id, .. }
            | SubscriptionEvent::Extended { user_id, .. }
            | SubscriptionEvent::Cancelled { user_id, .. }
            | SubscriptionEvent::Expired { user_id, .. }
            | SubscriptionEvent::ExpiringSoon { user_id, .. } => user_id,
        }
    }

    /// Returns when the event occurred.
    pub fn occurred_at(&self) -> Timestamp {
        match self {
            SubscriptionEvent::Created { occurred_at, .. }
            | SubscriptionEvent::Extended { occurred_at, .. }
            | SubscriptionEvent::Cancelled { occurred_at, .. }
            | SubscriptionEvent::Expired { occurred_at, .. }
            | SubscriptionEvent::ExpiringSoon { occurred_at, .. } => *occurred_at,
        }
    }
}
