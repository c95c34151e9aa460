//! HTTP DTOs for the subscription and session endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{Subscription, SubscriptionStatus, SubscriptionType};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Open a subscription for a user (payment confirmed upstream).
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    pub subscription_type: SubscriptionType,
    /// Overrides the plan's natural duration.
    #[serde(default)]
    pub duration_months: Option<u32>,
}

/// Add one term of a plan to the user's active subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtendRequest {
    pub subscription_type: SubscriptionType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutoRenewalRequest {
    pub enabled: bool,
}

/// Query for the expiring-soon listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpiringQuery {
    #[serde(default = "default_expiring_days")]
    pub days: i64,
}

fn default_expiring_days() -> i64 {
    3
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// One subscription as seen over the API.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    pub id: String,
    pub user_id: String,
    pub subscription_type: SubscriptionType,
    pub status: SubscriptionStatus,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub auto_renewal_enabled: bool,
    pub is_active: bool,
    pub days_remaining: u32,
}

impl SubscriptionView {
    pub fn at(subscription: &Subscription, now: Timestamp) -> Self {
        Self {
            id: subscription.id.to_string(),
            user_id: subscription.user_id.to_string(),
            subscription_type: subscription.subscription_type,
            status: subscription.status,
            start_date: subscription.start_date,
            end_date: subscription.end_date,
            auto_renewal_enabled: subscription.auto_renewal_enabled,
            is_active: subscription.is_active_at(now),
            days_remaining: subscription.days_remaining(now),
        }
    }
}

/// Current subscription; `null` when there is none.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub subscription: Option<SubscriptionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionListResponse {
    pub subscriptions: Vec<SubscriptionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VipStatusResponse {
    pub vip: bool,
    pub end_date: Option<Timestamp>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}
