use anyhow::Result;
use rentifier_common::types::MonitoredCity;

use crate::rows::MonitoredCityRow;
use crate::Store;

impl Store {
    /// Enabled cities in crawl order: highest priority first, id as the
    /// tie-break so the round-robin index stays stable between runs.
    pub async fn enabled_cities(&self) -> Result<Vec<MonitoredCity>> {
        let rows = sqlx::query_as::<_, MonitoredCityRow>(
            "SELECT * FROM monitored_cities WHERE enabled = TRUE ORDER BY priority DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Operator seed: insert or refresh a monitored city by its code.
    pub async fn seed_city(&self, name: &str, code: i32, priority: i32) -> Result<MonitoredCity> {
        let row = sqlx::query_as::<_, MonitoredCityRow>(
            r#"
            INSERT INTO monitored_cities (city_name, city_code, priority)
            VALUES ($1, $2, $3)
            ON CONFLICT (city_code) DO UPDATE
            SET city_name = EXCLUDED.city_name, priority = EXCLUDED.priority
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(code)
        .bind(priority)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }
}
