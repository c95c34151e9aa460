//! AccessGuard - decides whether a caller holds a capability.
//!
//! Role and subscription are independent gates. A `VIP` role grants
//! nothing on its own where an active subscription is required, and an
//! active subscription does not change the caller's role.
//!
//! Only storage failures are errors; every expected negative outcome is
//! an `AccessDecision::Denied` value.

use std::sync::Arc;

use crate::domain::access::{AccessDecision, AccessDenial, Capability, Role};
use crate::domain::foundation::{DomainError, TokenClaims};
use crate::ports::{SubscriptionChecker, UserDirectory};

use super::tokens::TokenService;

pub struct AccessGuard {
    tokens: Arc<TokenService>,
    subscriptions: Arc<dyn SubscriptionChecker>,
    directory: Arc<dyn UserDirectory>,
}

impl AccessGuard {
    pub fn new(
        tokens: Arc<TokenService>,
        subscriptions: Arc<dyn SubscriptionChecker>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            tokens,
            subscriptions,
            directory,
        }
    }

    /// Check `capability` for a caller whose token has already been
    /// validated. `None` means no credentials were presented.
    ///
    /// # Errors
    ///
    /// Returns the storage error when the role or subscription lookup fails.
    pub async fn authorize(
        &self,
        claims: Option<&TokenClaims>,
        capability: &Capability,
    ) -> Result<AccessDecision, DomainError> {
        let Some(claims) = claims else {
            return Ok(AccessDecision::Denied(AccessDenial::Unauthenticated));
        };

        let decision = match capability {
            Capability::Authenticated => AccessDecision::Allowed,
            Capability::RoleIn(allowed) => self.check_role(claims, allowed).await?,
            Capability::ActiveSubscription => self.check_subscription(claims).await?,
        };

        match decision.denial() {
            None => tracing::debug!(subject = %claims.sub, capability = %capability, "Access granted"),
            Some(denial) => tracing::debug!(
                subject = %claims.sub,
                capability = %capability,
                code = %denial.code(),
                "Access denied"
            ),
        }
        Ok(decision)
    }

    /// Validate a raw bearer token, then check `capability`.
    ///
    /// Invalid tokens become `Denied(InvalidToken)` with the reason.
    pub async fn authorize_bearer(
        &self,
        token: Option<&str>,
        capability: &Capability,
    ) -> Result<AccessDecision, DomainError> {
        let Some(token) = token else {
            return self.authorize(None, capability).await;
        };

        match self.tokens.validate(token) {
            Ok(claims) => self.authorize(Some(&claims), capability).await,
            Err(reason) => {
                tracing::warn!(reason = reason.reason(), "Rejected bearer token");
                Ok(AccessDecision::Denied(AccessDenial::from(reason)))
            }
        }
    }

    async fn check_role(
        &self,
        claims: &TokenClaims,
        allowed: &[Role],
    ) -> Result<AccessDecision, DomainError> {
        let role_name = match claims.user_id() {
            Some(user_id) => match self.directory.find_role(user_id).await? {
                Some(role) => role.as_str().to_string(),
                None => claims.role_name().to_string(),
            },
            None => claims.role_name().to_string(),
        };

        if allowed.iter().any(|role| role.as_str() == role_name) {
            Ok(AccessDecision::Allowed)
        } else {
            Ok(AccessDecision::Denied(AccessDenial::InsufficientRole {
                role: role_name,
                allowed: allowed.to_vec(),
            }))
        }
    }

    async fn check_subscription(&self, claims: &TokenClaims) -> Result<AccessDecision, DomainError> {
        let Some(user_id) = claims.user_id() else {
            return Ok(AccessDecision::Denied(AccessDenial::SubscriptionInactive));
        };

        if self.subscriptions.is_active(user_id).await? {
            Ok(AccessDecision::Allowed)
        } else {
            Ok(AccessDecision::Denied(AccessDenial::SubscriptionInactive))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryUserDirectory, ManualClock};
    use crate::config::AuthConfig;
    use crate::domain::foundation::{ErrorCode, InvalidToken, Timestamp, UserId};
    use async_trait::async_trait;
    use std::collections::HashSet;

    struct FixedChecker {
        active: HashSet<UserId>,
        fail: bool,
    }

    #[async_trait]
    impl SubscriptionChecker for FixedChecker {
        async fn is_active(&self, user_id: &UserId) -> Result<bool, DomainError> {
            if self.fail {
                return Err(DomainError::database("lookup failed"));
            }
            Ok(self.active.contains(user_id))
        }
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn guard_with(active: &[&str], fail: bool) -> (AccessGuard, Arc<InMemoryUserDirectory>) {
        let clock = Arc::new(ManualClock::new(
            Timestamp::from_unix_secs(1_700_000_000).unwrap(),
        ));
        let tokens = Arc::new(TokenService::new(
            &AuthConfig::with_secret("guard-test-secret-guard-test-secret"),
            clock,
        ));
        let checker = Arc::new(FixedChecker {
            active: active.iter().map(|id| user(id)).collect(),
            fail,
        });
        let directory = Arc::new(InMemoryUserDirectory::new());
        (
            AccessGuard::new(tokens, checker, directory.clone()),
            directory,
        )
    }

    fn claims(role: &str, uid: Option<&str>) -> TokenClaims {
        TokenClaims {
            sub: "someone".to_string(),
            role: role.to_string(),
            uid: uid.map(user),
            iat: 1_700_000_000,
            exp: 1_700_864_000,
            iss: "vip-access".to_string(),
            jti: "j".to_string(),
        }
    }

    #[tokio::test]
    async fn missing_claims_are_unauthenticated() {
        let (guard, _) = guard_with(&[], false);
        let decision = guard.authorize(None, &Capability::Authenticated).await.unwrap();
        assert_eq!(decision, AccessDecision::Denied(AccessDenial::Unauthenticated));
    }

    #[tokio::test]
    async fn vip_role_without_subscription_is_denied() {
        let (guard, _) = guard_with(&[], false);
        let decision = guard
            .authorize(Some(&claims("VIP", Some("3"))), &Capability::ActiveSubscription)
            .await
            .unwrap();
        assert_eq!(decision, AccessDecision::Denied(AccessDenial::SubscriptionInactive));
    }

    #[tokio::test]
    async fn active_subscription_is_allowed_regardless_of_role() {
        let (guard, _) = guard_with(&["3"], false);
        let decision = guard
            .authorize(Some(&claims("USER", Some("3"))), &Capability::ActiveSubscription)
            .await
            .unwrap();
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn token_without_user_id_has_no_subscription() {
        let (guard, _) = guard_with(&["3"], false);
        let decision = guard
            .authorize(Some(&claims("VIP", None)), &Capability::ActiveSubscription)
            .await
            .unwrap();
        assert_eq!(decision, AccessDecision::Denied(AccessDenial::SubscriptionInactive));
    }

    #[tokio::test]
    async fn role_match_is_case_sensitive() {
        let (guard, _) = guard_with(&[], false);
        let cap = Capability::role_in([Role::Vip]);

        let exact = guard.authorize(Some(&claims("VIP", None)), &cap).await.unwrap();
        assert!(exact.is_allowed());

        let lower = guard.authorize(Some(&claims("vip", None)), &cap).await.unwrap();
        assert_eq!(
            lower,
            AccessDecision::Denied(AccessDenial::InsufficientRole {
                role: "vip".to_string(),
                allowed: vec![Role::Vip],
            })
        );
    }

    #[tokio::test]
    async fn directory_role_overrides_token_claim() {
        let (guard, directory) = guard_with(&[], false);
        directory.set_role(user("3"), Role::User).await;
        let cap = Capability::role_in([Role::Admin]);

        let decision = guard
            .authorize(Some(&claims("ADMIN", Some("3"))), &cap)
            .await
            .unwrap();
        assert!(!decision.is_allowed());

        directory.set_role(user("3"), Role::Admin).await;
        let decision = guard
            .authorize(Some(&claims("USER", Some("3"))), &cap)
            .await
            .unwrap();
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn storage_failure_is_an_error() {
        let (guard, _) = guard_with(&[], true);
        let err = guard
            .authorize(Some(&claims("VIP", Some("3"))), &Capability::ActiveSubscription)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[tokio::test]
    async fn bearer_revoked_token_reports_revoked() {
        let (guard, _) = guard_with(&["3"], false);
        let issued = guard.tokens.issue("alice", Role::Vip, Some(user("3"))).unwrap();

        let ok = guard
            .authorize_bearer(Some(&issued.token), &Capability::ActiveSubscription)
            .await
            .unwrap();
        assert!(ok.is_allowed());

        guard.tokens.revoke(&issued.token);
        let denied = guard
            .authorize_bearer(Some(&issued.token), &Capability::Authenticated)
            .await
            .unwrap();
        assert_eq!(
            denied,
            AccessDecision::Denied(AccessDenial::InvalidToken {
                reason: InvalidToken::Revoked
            })
        );
    }

    #[tokio::test]
    async fn bearer_missing_is_unauthenticated() {
        let (guard, _) = guard_with(&[], false);
        let decision = guard
            .authorize_bearer(None, &Capability::Authenticated)
            .await
            .unwrap();
        assert_eq!(decision, AccessDecision::Denied(AccessDenial::Unauthenticated));
    }
}
