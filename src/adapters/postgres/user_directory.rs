//! PostgreSQL implementation of UserDirectory.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::access::Role;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::UserDirectory;

/// Role lookup against the `user_roles` table.
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_role(&self, user_id: &UserId) -> Result<Option<Role>, DomainError> {
        let role: Option<String> =
            sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1")
                .bind(user_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database(format!("Failed to look up role: {}", e)))?;

        // Unknown stored names are an error, never a missing role.
        role.map(|name| {
            name.parse::<Role>().map_err(|_| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Unknown role '{}' stored for user", name),
                )
                .with_detail("user_id", user_id.to_string())
            })
        })
        .transpose()
    }
}
