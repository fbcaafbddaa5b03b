use anyhow::Result;
use chrono::{DateTime, Utc};
use rentifier_common::types::{RunStatus, WorkerState};

use crate::rows::WorkerStateRow;
use crate::Store;

impl Store {
    pub async fn worker_state(&self, worker_name: &str) -> Result<Option<WorkerState>> {
        let row = sqlx::query_as::<_, WorkerStateRow>(
            "SELECT * FROM worker_states WHERE worker_name = $1",
        )
        .bind(worker_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    pub async fn update_worker_state(
        &self,
        worker_name: &str,
        last_run_at: DateTime<Utc>,
        status: RunStatus,
        error: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO worker_states (worker_name, last_run_at, last_status, last_error)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (worker_name) DO UPDATE
            SET last_run_at = $2, last_status = $3, last_error = $4
            "#,
        )
        .bind(worker_name)
        .bind(last_run_at)
        .bind(status.to_string())
        .bind(error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
