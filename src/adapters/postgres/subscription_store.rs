//! PostgreSQL implementation of SubscriptionStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{Subscription, SubscriptionStatus, SubscriptionType};
use crate::ports::SubscriptionStore;

/// Partial unique index backing the one-Active-record-per-user rule.
const ONE_ACTIVE_PER_USER: &str = "subscriptions_one_active_per_user";

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, subscription_type, status, start_date, end_date,
           auto_renewal_enabled, created_at, updated_at, cancelled_at, expired_at
    FROM subscriptions
"#;

/// Subscription records in the `subscriptions` table.
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: String,
    subscription_type: String,
    status: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    auto_renewal_enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cancelled_at: Option<DateTime<Utc>>,
    expired_at: Option<DateTime<Utc>>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let user_id = UserId::new(row.user_id)
            .map_err(|e| corrupt_row(format!("Invalid user_id: {}", e)))?;
        let subscription_type: SubscriptionType =
            row.subscription_type.parse().map_err(corrupt_row)?;
        let status: SubscriptionStatus = row.status.parse().map_err(corrupt_row)?;

        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id,
            subscription_type,
            start_date: Timestamp::from_datetime(row.start_date),
            end_date: Timestamp::from_datetime(row.end_date),
            status,
            auto_renewal_enabled: row.auto_renewal_enabled,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
            expired_at: row.expired_at.map(Timestamp::from_datetime),
        })
    }
}

fn corrupt_row(message: String) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, message)
}

fn query_failed(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", action, e))
}

fn into_subscriptions(rows: Vec<SubscriptionRow>) -> Result<Vec<Subscription>, DomainError> {
    rows.into_iter().map(Subscription::try_from).collect()
}

async fn upsert<'e, E>(executor: E, subscription: &Subscription) -> Result<(), DomainError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO subscriptions (
            id, user_id, subscription_type, status, start_date, end_date,
            auto_renewal_enabled, created_at, updated_at, cancelled_at, expired_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (id) DO UPDATE SET
            subscription_type = EXCLUDED.subscription_type,
            status = EXCLUDED.status,
            end_date = EXCLUDED.end_date,
            auto_renewal_enabled = EXCLUDED.auto_renewal_enabled,
            updated_at = EXCLUDED.updated_at,
            cancelled_at = EXCLUDED.cancelled_at,
            expired_at = EXCLUDED.expired_at
        "#,
    )
    .bind(subscription.id.as_uuid())
    .bind(subscription.user_id.as_str())
    .bind(subscription.subscription_type.as_str())
    .bind(subscription.status.as_str())
    .bind(subscription.start_date.as_datetime())
    .bind(subscription.end_date.as_datetime())
    .bind(subscription.auto_renewal_enabled)
    .bind(subscription.created_at.as_datetime())
    .bind(subscription.updated_at.as_datetime())
    .bind(subscription.cancelled_at.map(|t| *t.as_datetime()))
    .bind(subscription.expired_at.map(|t| *t.as_datetime()))
    .execute(executor)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.constraint() == Some(ONE_ACTIVE_PER_USER) {
                return DomainError::new(
                    ErrorCode::Conflict,
                    "User already has an active subscription",
                );
            }
        }
        query_failed("save subscription", e)
    })?;

    Ok(())
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    async fn find_active_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        let sql = format!("{} WHERE user_id = $1 AND status = 'active'", SELECT_COLUMNS);
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("find active subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_all_active_with_end_date_before(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<Subscription>, DomainError> {
        let sql = format!(
            "{} WHERE status = 'active' AND end_date < $1 ORDER BY end_date ASC",
            SELECT_COLUMNS
        );
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(cutoff.as_datetime())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed("find overdue subscriptions", e))?;

        into_subscriptions(rows)
    }

    async fn find_all_active_with_end_date_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Subscription>, DomainError> {
        let sql = format!(
            "{} WHERE status = 'active' AND end_date BETWEEN $1 AND $2 ORDER BY end_date ASC",
            SELECT_COLUMNS
        );
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(from.as_datetime())
            .bind(to.as_datetime())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed("find expiring subscriptions", e))?;

        into_subscriptions(rows)
    }

    async fn find_all_by_user(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError> {
        let sql = format!(
            "{} WHERE user_id = $1 ORDER BY start_date DESC, created_at DESC",
            SELECT_COLUMNS
        );
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed("load subscription history", e))?;

        into_subscriptions(rows)
    }

    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        upsert(&self.pool, subscription).await
    }

    async fn replace_active(
        &self,
        previous: &Subscription,
        next: &Subscription,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_failed("begin transaction", e))?;

        // Previous first, so the partial unique index never sees two Active rows.
        upsert(&mut *tx, previous).await?;
        upsert(&mut *tx, next).await?;

        tx.commit()
            .await
            .map_err(|e| query_failed("commit transaction", e))?;
        Ok(())
    }
}
