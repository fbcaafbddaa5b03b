//! Row structs local to the store crate. Domain types stay sqlx-free;
//! everything read from Postgres passes through one of these.

use chrono::{DateTime, Utc};
use rentifier_common::types::{
    Filter, Listing, MonitoredCity, RawListing, RunStatus, Source, SourceState, User, WorkerState,
};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SourceRow {
    pub id: Uuid,
    pub name: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SourceRow> for Source {
    fn from(r: SourceRow) -> Self {
        Source {
            id: r.id,
            name: r.name,
            enabled: r.enabled,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SourceStateRow {
    pub source_id: Uuid,
    pub cursor: Option<String>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_status: Option<String>,
    pub last_error: Option<String>,
}

impl From<SourceStateRow> for SourceState {
    fn from(r: SourceStateRow) -> Self {
        SourceState {
            source_id: r.source_id,
            cursor: r.cursor,
            last_run_at: r.last_run_at,
            last_status: r.last_status.and_then(|s| s.parse::<RunStatus>().ok()),
            last_error: r.last_error,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MonitoredCityRow {
    pub id: Uuid,
    pub city_name: String,
    pub city_code: i32,
    pub enabled: bool,
    pub priority: i32,
}

impl From<MonitoredCityRow> for MonitoredCity {
    fn from(r: MonitoredCityRow) -> Self {
        MonitoredCity {
            id: r.id,
            city_name: r.city_name,
            city_code: r.city_code,
            enabled: r.enabled,
            priority: r.priority,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RawListingRow {
    pub id: Uuid,
    pub source_id: Uuid,
    pub source_item_id: String,
    pub url: String,
    pub raw_json: String,
    pub fetched_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<RawListingRow> for RawListing {
    fn from(r: RawListingRow) -> Self {
        RawListing {
            id: r.id,
            source_id: r.source_id,
            source_item_id: r.source_item_id,
            url: r.url,
            raw_json: r.raw_json,
            fetched_at: r.fetched_at,
            processed_at: r.processed_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ListingRow {
    pub id: Uuid,
    pub source_id: Uuid,
    pub source_item_id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub price_period: Option<String>,
    pub bedrooms: Option<f64>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub floor: Option<i32>,
    pub square_meters: Option<f64>,
    pub property_type: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub tags: serde_json::Value,
    pub relevance_score: Option<f32>,
    pub url: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub ingested_at: DateTime<Utc>,
}

impl From<ListingRow> for Listing {
    fn from(r: ListingRow) -> Self {
        Listing {
            id: r.id,
            source_id: r.source_id,
            source_item_id: r.source_item_id,
            title: r.title,
            description: r.description,
            price: r.price,
            currency: r.currency,
            price_period: r.price_period.and_then(|p| p.parse().ok()),
            bedrooms: r.bedrooms,
            city: r.city,
            neighborhood: r.neighborhood,
            street: r.street,
            house_number: r.house_number,
            floor: r.floor,
            square_meters: r.square_meters,
            property_type: r.property_type,
            latitude: r.latitude,
            longitude: r.longitude,
            image_url: r.image_url,
            tags: json_string_vec(&r.tags),
            relevance_score: r.relevance_score,
            url: r.url,
            posted_at: r.posted_at,
            ingested_at: r.ingested_at,
        }
    }
}

/// Flat join row for `filters JOIN users`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct FilterUserRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_bedrooms: Option<f64>,
    pub max_bedrooms: Option<f64>,
    pub cities: serde_json::Value,
    pub neighborhoods: serde_json::Value,
    pub keywords: serde_json::Value,
    pub must_have_tags: serde_json::Value,
    pub exclude_tags: serde_json::Value,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub chat_id: i64,
    pub display_name: Option<String>,
    pub user_created_at: DateTime<Utc>,
}

impl From<FilterUserRow> for (Filter, User) {
    fn from(r: FilterUserRow) -> Self {
        let filter = Filter {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            min_price: r.min_price,
            max_price: r.max_price,
            min_bedrooms: r.min_bedrooms,
            max_bedrooms: r.max_bedrooms,
            cities: json_string_vec(&r.cities),
            neighborhoods: json_string_vec(&r.neighborhoods),
            keywords: json_string_vec(&r.keywords),
            must_have_tags: json_string_vec(&r.must_have_tags),
            exclude_tags: json_string_vec(&r.exclude_tags),
            enabled: r.enabled,
            created_at: r.created_at,
        };
        let user = User {
            id: r.user_id,
            chat_id: r.chat_id,
            display_name: r.display_name,
            created_at: r.user_created_at,
        };
        (filter, user)
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub chat_id: i64,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            chat_id: r.chat_id,
            display_name: r.display_name,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct WorkerStateRow {
    pub worker_name: String,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_status: Option<String>,
    pub last_error: Option<String>,
}

impl From<WorkerStateRow> for WorkerState {
    fn from(r: WorkerStateRow) -> Self {
        WorkerState {
            worker_name: r.worker_name,
            last_run_at: r.last_run_at,
            last_status: r.last_status.and_then(|s| s.parse().ok()),
            last_error: r.last_error,
        }
    }
}

/// JSONB array of strings → Vec<String>. Anything else (NULL, wrong shape)
/// reads as empty.
pub(crate) fn json_string_vec(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_string_vec_reads_arrays() {
        let v = serde_json::json!(["תל אביב", "חיפה"]);
        assert_eq!(json_string_vec(&v), vec!["תל אביב", "חיפה"]);
    }

    #[test]
    fn json_string_vec_tolerates_non_arrays() {
        assert!(json_string_vec(&serde_json::Value::Null).is_empty());
        assert!(json_string_vec(&serde_json::json!({"a": 1})).is_empty());
        assert_eq!(json_string_vec(&serde_json::json!(["x", 3])), vec!["x"]);
    }
}
