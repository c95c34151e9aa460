//! Subscription status state machine.
//!
//! A subscription record starts Active. Expired and Cancelled are terminal
//! for that record; a returning user gets a brand-new record.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subscription lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid access window is open (subject to the live end-date check).
    Active,

    /// End date passed and the sweep recorded it.
    Expired,

    /// Ended by explicit user/admin action or superseded by a new record.
    Cancelled,
}

impl SubscriptionStatus {
    /// Stable lowercase name used for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "expired" => Ok(SubscriptionStatus::Expired),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            other => Err(format!("unknown subscription status: {}", other)),
        }
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            (Active, Active) // Extension
                | (Active, Expired)
                | (Active, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Active => vec![Active, Expired, Cancelled],
            Expired => vec![],
            Cancelled => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_can_expire() {
        let result = SubscriptionStatus::Active.transition_to(SubscriptionStatus::Expired);
        assert_eq!(result, Ok(SubscriptionStatus::Expired));
    }

    #[test]
    fn active_can_cancel() {
        let result = SubscriptionStatus::Active.transition_to(SubscriptionStatus::Cancelled);
        assert_eq!(result, Ok(SubscriptionStatus::Cancelled));
    }

    #[test]
    fn active_can_stay_active_on_extension() {
        assert!(SubscriptionStatus::Active.can_transition_to(&SubscriptionStatus::Active));
    }

    #[test]
    fn expired_is_terminal() {
        assert!(SubscriptionStatus::Expired.is_terminal());
        assert!(SubscriptionStatus::Expired
            .transition_to(SubscriptionStatus::Active)
            .is_err());
    }

    #[test]
    fn cancelled_is_terminal() {
        assert!(SubscriptionStatus::Cancelled.is_terminal());
        assert!(SubscriptionStatus::Cancelled
            .transition_to(SubscriptionStatus::Expired)
            .is_err());
    }

    #[test]
    fn valid_transitions_are_consistent_with_can_transition_to() {
        for status in [
            SubscriptionStatus::Active,
            SubscriptionStatus::Expired,
            SubscriptionStatus::Cancelled,
        ] {
            for target in status.valid_transitions() {
                assert!(status.can_transition_to(&target));
            }
        }
    }

    #[test]
    fn status_parses_its_own_name() {
        for status in [
            SubscriptionStatus::Active,
            SubscriptionStatus::Expired,
            SubscriptionStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<SubscriptionStatus>(), Ok(status));
        }
        assert!("ACTIVE".parse::<SubscriptionStatus>().is_err());
    }
}
