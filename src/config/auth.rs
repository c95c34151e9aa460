//! Token signing configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum HMAC key length accepted in production.
pub const MIN_PRODUCTION_SECRET_BYTES: usize = 32;

/// Session token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 signing key.
    pub signing_secret: SecretString,

    /// Value of the `iss` claim; tokens from any other issuer are rejected.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// How long an issued token stays valid.
    #[serde(default = "default_token_lifetime_days")]
    pub token_lifetime_days: i64,
}

impl AuthConfig {
    /// Build a config from a raw secret with default issuer and lifetime.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            signing_secret: SecretString::new(secret.into()),
            issuer: default_issuer(),
            token_lifetime_days: default_token_lifetime_days(),
        }
    }

    /// Token lifetime as a chrono duration.
    pub fn token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::days(self.token_lifetime_days)
    }

    /// Validate authentication configuration.
    ///
    /// Short secrets are tolerated outside production.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret_len = self.signing_secret.expose_secret().len();
        if secret_len == 0 {
            return Err(ValidationError::MissingRequired("AUTH__SIGNING_SECRET"));
        }
        if *environment == Environment::Production && secret_len < MIN_PRODUCTION_SECRET_BYTES {
            return Err(ValidationError::SigningSecretTooShort(
                MIN_PRODUCTION_SECRET_BYTES,
            ));
        }
        if self.issuer.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__ISSUER"));
        }
        if !(1..=365).contains(&self.token_lifetime_days) {
            return Err(ValidationError::InvalidTokenLifetime);
        }
        Ok(())
    }
}

fn default_issuer() -> String {
    "vip-access".to_string()
}

fn default_token_lifetime_days() -> i64 {
    10
}
