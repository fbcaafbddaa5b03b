//! Persisted run log — one row per job run with its serialized summary.

use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::Store;

impl Store {
    pub async fn record_job_run(
        &self,
        job: &str,
        run_id: Uuid,
        started_at: DateTime<Utc>,
        summary: &serde_json::Value,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO job_runs (job, run_id, started_at, summary)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(job)
        .bind(run_id)
        .bind(started_at)
        .bind(summary)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
