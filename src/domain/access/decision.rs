//! Access decisions returned by the guard.

use serde::Serialize;

use crate::domain::foundation::{ErrorCode, InvalidToken};

use super::Role;

/// Outcome of a capability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied(AccessDenial),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }

    /// Returns the denial, if any.
    pub fn denial(&self) -> Option<&AccessDenial> {
        match self {
            AccessDecision::Allowed => None,
            AccessDecision::Denied(denial) => Some(denial),
        }
    }
}

/// Why access was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessDenial {
    /// No credentials were presented.
    Unauthenticated,

    /// Credentials were presented but rejected.
    InvalidToken {
        #[serde(serialize_with = "serialize_reason")]
        reason: InvalidToken,
    },

    /// Caller's role is not in the allowed set. `role` is the raw name
    /// the caller holds, which may not be a known role.
    InsufficientRole { role: String, allowed: Vec<Role> },

    /// No live subscription.
    SubscriptionInactive,
}

fn serialize_reason<S: serde::Serializer>(reason: &InvalidToken, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(reason.reason())
}

impl AccessDenial {
    /// Message safe to show to the caller.
    pub fn user_message(&self) -> &'static str {
        match self {
            AccessDenial::Unauthenticated => "Authentication required",
            AccessDenial::InvalidToken { reason } => match reason {
                InvalidToken::Expired => "Session expired, please sign in again",
                InvalidToken::Revoked => "Session has been signed out",
                InvalidToken::Malformed | InvalidToken::BadSignature => "Invalid credentials",
            },
            AccessDenial::InsufficientRole { .. } => "You do not have permission for this action",
            AccessDenial::SubscriptionInactive => "An active VIP subscription is required",
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AccessDenial::Unauthenticated => ErrorCode::Unauthenticated,
            AccessDenial::InvalidToken { .. } => ErrorCode::InvalidToken,
            AccessDenial::InsufficientRole { .. } => ErrorCode::InsufficientRole,
            AccessDenial::SubscriptionInactive => ErrorCode::SubscriptionInactive,
        }
    }
}

impl From<InvalidToken> for AccessDenial {
    fn from(reason: InvalidToken) -> Self {
        AccessDenial::InvalidToken { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revoked_and_expired_have_distinct_messages() {
        let revoked = AccessDenial::from(InvalidToken::Revoked);
        let expired = AccessDenial::from(InvalidToken::Expired);
        assert_ne!(revoked.user_message(), expired.user_message());
        assert_eq!(revoked.code(), ErrorCode::InvalidToken);
    }

    #[test]
    fn denial_serializes_reason_string() {
        let json = serde_json::to_value(AccessDenial::from(InvalidToken::Revoked)).unwrap();
        assert_eq!(json["kind"], "invalid_token");
        assert_eq!(json["reason"], "revoked");
    }

    #[test]
    fn decision_exposes_denial() {
        let d = AccessDecision::Denied(AccessDenial::SubscriptionInactive);
        assert!(!d.is_allowed());
        assert_eq!(d.denial(), Some(&AccessDenial::SubscriptionInactive));
        assert!(AccessDecision::Allowed.denial().is_none());
    }
}
