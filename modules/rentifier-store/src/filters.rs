//! Users and their saved filters. Both are owned by the external chat UI;
//! the pipeline reads them and the seed helpers exist for bootstrap and
//! integration testing.

use anyhow::Result;
use rentifier_common::types::{Filter, User};
use uuid::Uuid;

use crate::rows::{FilterUserRow, UserRow};
use crate::Store;

/// Input for a filter insert. List constraints land as JSONB arrays.
#[derive(Debug, Clone, Default)]
pub struct NewFilter {
    pub user_id: Uuid,
    pub name: String,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_bedrooms: Option<f64>,
    pub max_bedrooms: Option<f64>,
    pub cities: Vec<String>,
    pub neighborhoods: Vec<String>,
    pub keywords: Vec<String>,
    pub must_have_tags: Vec<String>,
    pub exclude_tags: Vec<String>,
}

impl Store {
    /// Enabled filters joined with their owners, filter id ascending —
    /// the notifier's evaluation order.
    pub async fn active_filters_with_users(&self) -> Result<Vec<(Filter, User)>> {
        let rows = sqlx::query_as::<_, FilterUserRow>(
            r#"
            SELECT f.id, f.user_id, f.name, f.min_price, f.max_price,
                   f.min_bedrooms, f.max_bedrooms, f.cities, f.neighborhoods,
                   f.keywords, f.must_have_tags, f.exclude_tags, f.enabled,
                   f.created_at,
                   u.chat_id, u.display_name, u.created_at AS user_created_at
            FROM filters f
            JOIN users u ON u.id = f.user_id
            WHERE f.enabled = TRUE
            ORDER BY f.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn seed_user(&self, chat_id: i64, display_name: Option<&str>) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (chat_id, display_name)
            VALUES ($1, $2)
            ON CONFLICT (chat_id) DO UPDATE SET display_name = EXCLUDED.display_name
            RETURNING *
            "#,
        )
        .bind(chat_id)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    pub async fn insert_filter(&self, filter: &NewFilter) -> Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO filters
                (user_id, name, min_price, max_price, min_bedrooms, max_bedrooms,
                 cities, neighborhoods, keywords, must_have_tags, exclude_tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(filter.user_id)
        .bind(&filter.name)
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(filter.min_bedrooms)
        .bind(filter.max_bedrooms)
        .bind(serde_json::to_value(&filter.cities)?)
        .bind(serde_json::to_value(&filter.neighborhoods)?)
        .bind(serde_json::to_value(&filter.keywords)?)
        .bind(serde_json::to_value(&filter.must_have_tags)?)
        .bind(serde_json::to_value(&filter.exclude_tags)?)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}
