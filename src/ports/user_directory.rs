//! User directory port.

use async_trait::async_trait;

use crate::domain::access::Role;
use crate::domain::foundation::{DomainError, UserId};

/// Read-only lookup of a user's current role.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns `None` when the user is unknown to the directory.
    async fn find_role(&self, user_id: &UserId) -> Result<Option<Role>, DomainError>;
}
