//! TokenService - issues, validates and revokes signed session tokens.
//!
//! Tokens are compact JWTs signed with HMAC-SHA256. Validation is pure
//! computation against the injected clock and the instance-owned
//! revocation set; there is no I/O on this path.
//!
//! Check order on `validate`:
//!
//! ```text
//! revoked? ─yes─► Revoked
//!    │ no
//! decode + verify signature/issuer ─fail─► Malformed | BadSignature
//!    │ ok
//! now >= exp? ─yes─► Expired
//!    │ no
//!    ▼
//! claims
//! ```

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::Serialize;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::domain::access::Role;
use crate::domain::foundation::{
    DomainError, ErrorCode, InvalidToken, Timestamp, TokenClaims, UserId,
};
use crate::ports::Clock;

use super::RevocationSet;

/// A freshly issued token with its claims.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    #[serde(skip)]
    pub claims: TokenClaims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.claims.expires_at()
    }
}

/// Issues and checks session tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    lifetime: chrono::Duration,
    revoked: RevocationSet,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let secret = config.signing_secret.expose_secret().as_bytes();

        // Expiry is checked against the injected clock, not the system time.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: config.issuer.clone(),
            lifetime: config.token_lifetime(),
            revoked: RevocationSet::new(),
            clock,
        }
    }

    /// Issue a token for `subject` valid from now for the configured lifetime.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if `subject` is empty
    /// - `InternalError` if encoding fails
    pub fn issue(
        &self,
        subject: &str,
        role: Role,
        user_id: Option<UserId>,
    ) -> Result<IssuedToken, DomainError> {
        if subject.trim().is_empty() {
            return Err(DomainError::validation("subject", "Subject cannot be empty"));
        }

        let now = self.clock.now();
        let claims = TokenClaims {
            sub: subject.to_string(),
            role: role.as_str().to_string(),
            uid: user_id,
            iat: now.as_unix_secs(),
            exp: now.plus(self.lifetime).as_unix_secs(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                DomainError::new(ErrorCode::InternalError, format!("Token encoding failed: {}", e))
            })?;

        tracing::debug!(subject = %claims.sub, role = %claims.role, "Issued session token");
        Ok(IssuedToken { token, claims })
    }

    /// Validate a raw token value. Fails closed.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, InvalidToken> {
        if self.revoked.contains(token) {
            return Err(InvalidToken::Revoked);
        }

        let claims = self.decode_verified(token)?;

        if claims.is_expired_at(self.clock.now()) {
            return Err(InvalidToken::Expired);
        }
        Ok(claims)
    }

    /// Revoke a token value. Idempotent.
    ///
    /// The entry is kept until the token's own expiry; values that do not
    /// decode are kept for one full lifetime.
    pub fn revoke(&self, token: &str) {
        let expires_at = match self.decode_verified(token) {
            Ok(claims) => claims.exp,
            Err(_) => self.clock.now().plus(self.lifetime).as_unix_secs(),
        };
        self.revoked.insert(token, expires_at);
        tracing::info!(revoked_count = self.revoked.len(), "Session token revoked");
    }

    /// Drop revocation entries whose token has naturally expired.
    pub fn prune_revocations(&self) -> usize {
        let removed = self.revoked.prune(self.clock.now());
        if removed > 0 {
            tracing::debug!(removed, remaining = self.revoked.len(), "Pruned revoked tokens");
        }
        removed
    }

    pub fn revoked_count(&self) -> usize {
        self.revoked.len()
    }

    fn decode_verified(&self, token: &str) -> Result<TokenClaims, InvalidToken> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAlgorithm => InvalidToken::BadSignature,
                ErrorKind::ExpiredSignature => InvalidToken::Expired,
                _ => InvalidToken::Malformed,
            })
    }
}
