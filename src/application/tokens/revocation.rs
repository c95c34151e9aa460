//! Revocation set for session tokens.

use dashmap::DashMap;

use crate::domain::foundation::Timestamp;

/// Raw token values that must be rejected regardless of signature or
/// expiry.
///
/// Each entry remembers the token's natural expiry (Unix seconds) so it
/// can be dropped once the token would fail validation as expired anyway.
/// Owned by one token service; not shared through a static.
#[derive(Debug, Default)]
pub struct RevocationSet {
    entries: DashMap<String, i64>,
}

impl RevocationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `token` as revoked until `expires_at`. Idempotent; a repeated
    /// revoke keeps the later expiry.
    pub fn insert(&self, token: &str, expires_at: i64) {
        self.entries
            .entry(token.to_string())
            .and_modify(|exp| *exp = (*exp).max(expires_at))
            .or_insert(expires_at);
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    /// Drop entries whose token has naturally expired at `now`.
    /// Returns how many were removed.
    pub fn prune(&self, now: Timestamp) -> usize {
        let cutoff = now.as_unix_secs();
        let before = self.entries.len();
        self.entries.retain(|_, exp| *exp > cutoff);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let set = RevocationSet::new();
        set.insert("abc", 100);
        set.insert("abc", 50);

        assert!(set.contains("abc"));
        assert_eq!(set.len(), 1);
        // keeps the later expiry
        assert_eq!(set.prune(Timestamp::from_unix_secs(60).unwrap()), 0);
    }

    #[test]
    fn prune_drops_naturally_expired_entries() {
        let set = RevocationSet::new();
        set.insert("old", 100);
        set.insert("new", 200);

        let removed = set.prune(Timestamp::from_unix_secs(100).unwrap());

        assert_eq!(removed, 1);
        assert!(!set.contains("old"));
        assert!(set.contains("new"));
    }
}
