//! In-memory user directory.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::access::Role;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::UserDirectory;

#[derive(Default)]
pub struct InMemoryUserDirectory {
    roles: RwLock<HashMap<UserId, Role>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_role(&self, user_id: UserId, role: Role) {
        self.roles.write().await.insert(user_id, role);
    }

    pub async fn remove(&self, user_id: &UserId) {
        self.roles.write().await.remove(user_id);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_role(&self, user_id: &UserId) -> Result<Option<Role>, DomainError> {
        Ok(self.roles.read().await.get(user_id).copied())
    }
}
