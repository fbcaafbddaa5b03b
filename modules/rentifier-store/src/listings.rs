//! Canonical listing upserts and the notifier's candidate query.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rentifier_common::types::{Listing, NewListing};
use uuid::Uuid;

use crate::rows::ListingRow;
use crate::Store;

impl Store {
    /// Upsert the canonical row and stamp the owning raw row as processed,
    /// in one transaction: either both land or neither does.
    ///
    /// The conflict branch refreshes every mutable field but never touches
    /// `ingested_at` — first-seen time is stable across re-processing.
    pub async fn upsert_listing_mark_processed(
        &self,
        raw_id: Uuid,
        listing: &NewListing,
        processed_at: DateTime<Utc>,
    ) -> Result<Uuid> {
        let tags = serde_json::to_value(&listing.tags)?;
        let mut tx = self.pool.begin().await?;

        let listing_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO listings
                (source_id, source_item_id, title, description, price, currency,
                 price_period, bedrooms, city, neighborhood, street, house_number,
                 floor, square_meters, property_type, latitude, longitude,
                 image_url, tags, relevance_score, url, posted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20, $21, $22)
            ON CONFLICT (source_id, source_item_id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                price = EXCLUDED.price,
                currency = EXCLUDED.currency,
                price_period = EXCLUDED.price_period,
                bedrooms = EXCLUDED.bedrooms,
                city = EXCLUDED.city,
                neighborhood = EXCLUDED.neighborhood,
                street = EXCLUDED.street,
                house_number = EXCLUDED.house_number,
                floor = EXCLUDED.floor,
                square_meters = EXCLUDED.square_meters,
                property_type = EXCLUDED.property_type,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                image_url = EXCLUDED.image_url,
                tags = EXCLUDED.tags,
                relevance_score = EXCLUDED.relevance_score,
                url = EXCLUDED.url,
                posted_at = EXCLUDED.posted_at
            RETURNING id
            "#,
        )
        .bind(listing.source_id)
        .bind(&listing.source_item_id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(&listing.currency)
        .bind(listing.price_period.map(|p| p.to_string()))
        .bind(listing.bedrooms)
        .bind(&listing.city)
        .bind(&listing.neighborhood)
        .bind(&listing.street)
        .bind(&listing.house_number)
        .bind(listing.floor)
        .bind(listing.square_meters)
        .bind(&listing.property_type)
        .bind(listing.latitude)
        .bind(listing.longitude)
        .bind(&listing.image_url)
        .bind(&tags)
        .bind(listing.relevance_score)
        .bind(&listing.url)
        .bind(listing.posted_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE listings_raw SET processed_at = $1 WHERE id = $2")
            .bind(processed_at)
            .bind(raw_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(listing_id)
    }

    /// Candidate listings for the notifier, newest first.
    pub async fn listings_since(&self, since: DateTime<Utc>) -> Result<Vec<Listing>> {
        let rows = sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT * FROM listings
            WHERE ingested_at > $1
            ORDER BY ingested_at DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
