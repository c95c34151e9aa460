//! Authentication types for the domain layer.
//!
//! `TokenClaims` is the decoded content of a session token; `InvalidToken`
//! explains why a presented token was rejected. Neither type knows how
//! tokens are signed; that lives in the token service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Timestamp, UserId};

/// Claims carried by a session token.
///
/// Claims are immutable once issued. Field names follow the registered
/// JWT claim names so the token stays readable by standard tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (login name) the token was issued to.
    pub sub: String,

    /// Role name at issuance, e.g. `"VIP"`.
    pub role: String,

    /// Internal user id, when the subject maps to a user record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<UserId>,

    /// Issued-at, Unix seconds.
    pub iat: i64,

    /// Expires-at, Unix seconds.
    pub exp: i64,

    /// Issuer.
    pub iss: String,

    /// Unique token id. Distinguishes tokens issued in the same second.
    pub jti: String,
}

impl TokenClaims {
    /// Returns the subject the token was issued to.
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Returns the role name claim.
    pub fn role_name(&self) -> &str {
        &self.role
    }

    /// Returns the user id claim, if present.
    pub fn user_id(&self) -> Option<&UserId> {
        self.uid.as_ref()
    }

    /// Returns the issue time.
    pub fn issued_at(&self) -> Option<Timestamp> {
        Timestamp::from_unix_secs(self.iat)
    }

    /// Returns the expiry time.
    pub fn expires_at(&self) -> Option<Timestamp> {
        Timestamp::from_unix_secs(self.exp)
    }

    /// A token is valid strictly before its expiry instant.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now.as_unix_secs() >= self.exp
    }
}

/// Why a presented token was rejected.
///
/// Always recoverable: the boundary maps every variant to an
/// authentication failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidToken {
    /// Not a structurally valid token.
    #[error("Malformed token")]
    Malformed,

    /// Signature or issuer does not check out.
    #[error("Invalid token signature")]
    BadSignature,

    /// Past its expiry time.
    #[error("Token expired")]
    Expired,

    /// Explicitly revoked (e.g. logout), regardless of remaining lifetime.
    #[error("Token revoked")]
    Revoked,
}

impl InvalidToken {
    /// Short machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            InvalidToken::Malformed => "malformed",
            InvalidToken::BadSignature => "bad_signature",
            InvalidToken::Expired => "expired",
            InvalidToken::Revoked => "revoked",
        }
    }
}
