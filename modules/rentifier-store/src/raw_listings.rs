//! Raw candidate persistence. Inserts are idempotent by
//! `(source_id, source_item_id)`; duplicates drop silently.

use anyhow::Result;
use rentifier_common::types::RawListing;
use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::rows::RawListingRow;
use crate::Store;

/// Postgres caps bind parameters per statement; 500 rows × 4 binds stays
/// comfortably inside it.
const INSERT_CHUNK: usize = 500;

/// One raw candidate ready to insert.
#[derive(Debug, Clone)]
pub struct RawListingInsert {
    pub source_item_id: String,
    pub url: String,
    pub raw_json: String,
}

impl Store {
    /// Batch-insert raw candidates, chunked. An identical re-emit drops
    /// silently; a conflicting row whose payload changed is refreshed and
    /// reopened (`processed_at` cleared) so the processor re-normalizes it.
    /// Returns how many rows were written either way.
    pub async fn insert_raw_listings(
        &self,
        source_id: Uuid,
        rows: &[RawListingInsert],
    ) -> Result<u64> {
        let mut written = 0u64;
        for chunk in rows.chunks(INSERT_CHUNK) {
            let mut qb = QueryBuilder::new(
                "INSERT INTO listings_raw (source_id, source_item_id, url, raw_json) ",
            );
            qb.push_values(chunk, |mut b, row| {
                b.push_bind(source_id)
                    .push_bind(&row.source_item_id)
                    .push_bind(&row.url)
                    .push_bind(&row.raw_json);
            });
            qb.push(
                " ON CONFLICT (source_id, source_item_id) DO UPDATE \
                 SET raw_json = EXCLUDED.raw_json, url = EXCLUDED.url, \
                     fetched_at = now(), processed_at = NULL \
                 WHERE listings_raw.raw_json IS DISTINCT FROM EXCLUDED.raw_json",
            );
            let result = qb.build().execute(&self.pool).await?;
            written += result.rows_affected();
        }
        Ok(written)
    }

    /// The processor's work queue: oldest unprocessed rows first.
    pub async fn unprocessed_raw(&self, limit: i64) -> Result<Vec<RawListing>> {
        let rows = sqlx::query_as::<_, RawListingRow>(
            r#"
            SELECT * FROM listings_raw
            WHERE processed_at IS NULL
            ORDER BY fetched_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_splits_large_batches() {
        let rows: Vec<RawListingInsert> = (0..1203)
            .map(|i| RawListingInsert {
                source_item_id: i.to_string(),
                url: format!("https://example.com/{i}"),
                raw_json: "{}".to_string(),
            })
            .collect();
        let chunks: Vec<_> = rows.chunks(INSERT_CHUNK).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 500);
        assert_eq!(chunks[2].len(), 203);
    }
}
