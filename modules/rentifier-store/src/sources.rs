//! Source registry rows and per-source collector state.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rentifier_common::types::{Source, SourceState};
use uuid::Uuid;

use crate::rows::{SourceRow, SourceStateRow};
use crate::Store;

impl Store {
    pub async fn enabled_sources(&self) -> Result<Vec<Source>> {
        let rows = sqlx::query_as::<_, SourceRow>(
            "SELECT * FROM sources WHERE enabled = TRUE ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn source_by_id(&self, id: Uuid) -> Result<Option<Source>> {
        let row = sqlx::query_as::<_, SourceRow>("SELECT * FROM sources WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Operator seed: insert a source by name if absent, return it either way.
    pub async fn seed_source(&self, name: &str) -> Result<Source> {
        let row = sqlx::query_as::<_, SourceRow>(
            r#"
            INSERT INTO sources (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING *
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    pub async fn source_state(&self, source_id: Uuid) -> Result<Option<SourceState>> {
        let row = sqlx::query_as::<_, SourceStateRow>(
            "SELECT * FROM source_states WHERE source_id = $1",
        )
        .bind(source_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Successful collection: advance the cursor and clear the error.
    pub async fn mark_source_success(
        &self,
        source_id: Uuid,
        cursor: Option<&str>,
        run_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO source_states (source_id, cursor, last_run_at, last_status, last_error)
            VALUES ($1, $2, $3, 'ok', NULL)
            ON CONFLICT (source_id) DO UPDATE
            SET cursor = $2, last_run_at = $3, last_status = 'ok', last_error = NULL
            "#,
        )
        .bind(source_id)
        .bind(cursor)
        .bind(run_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Failed collection: record the error. The cursor only moves when the
    /// connector handed back an updated state envelope (circuit counters);
    /// otherwise whatever was stored stays stored.
    pub async fn mark_source_failure(
        &self,
        source_id: Uuid,
        error: &str,
        cursor: Option<&str>,
        run_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO source_states (source_id, cursor, last_run_at, last_status, last_error)
            VALUES ($1, $2, $3, 'error', $4)
            ON CONFLICT (source_id) DO UPDATE
            SET cursor = COALESCE($2, source_states.cursor),
                last_run_at = $3,
                last_status = 'error',
                last_error = $4
            "#,
        )
        .bind(source_id)
        .bind(cursor)
        .bind(run_at)
        .bind(error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
