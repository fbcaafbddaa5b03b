//! Delivery bookkeeping. The `(user_id, listing_id)` primary key is the
//! at-most-once ceiling; conflicting inserts are expected, not errors.

use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::Store;

impl Store {
    pub async fn notification_exists(&self, user_id: Uuid, listing_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM notifications_sent
                WHERE user_id = $1 AND listing_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(listing_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Record a delivery. Returns false when a concurrent or earlier run
    /// already recorded this (user, listing) pair.
    pub async fn record_notification(
        &self,
        user_id: Uuid,
        listing_id: Uuid,
        filter_id: Option<Uuid>,
        channel: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications_sent (user_id, listing_id, filter_id, sent_at, channel)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, listing_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(listing_id)
        .bind(filter_id)
        .bind(sent_at)
        .bind(channel)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
