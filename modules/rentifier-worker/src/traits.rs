// Trait abstractions for the three jobs.
//
// Connector — the per-marketplace contract (fetch + normalize).
// ConnectorStoreView — the read-only slice of the store a connector sees.
// CollectorStore / ProcessorStore / NotifierStore — exactly the queries
//   each job needs, implemented by the Postgres Store and by MemoryStore.
// ChatTransport — deliver text/photo to a chat, report retryability.
//
// These enable deterministic testing: no network, no database, no Docker.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use rentifier_common::types::{
    FetchBatch, Filter, Listing, ListingCandidate, ListingDraft, MonitoredCity, NewListing,
    RawListing, RunStatus, Source, SourceState, User, WorkerState,
};
use rentifier_common::ConnectorError;
use rentifier_store::{RawListingInsert, Store};

// ---------------------------------------------------------------------------
// Connector contract
// ---------------------------------------------------------------------------

/// Read-only operator data exposed to connectors during a fetch.
#[async_trait]
pub trait ConnectorStoreView: Send + Sync {
    async fn enabled_cities(&self) -> Result<Vec<MonitoredCity>>;
}

/// One marketplace integration. `fetch_new` owns the opaque cursor;
/// `normalize` is pure and total — a candidate it cannot fully interpret
/// still yields a draft built from the raw fields.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Stable name, matching the `sources.name` row this connector serves.
    fn source_name(&self) -> &'static str;

    async fn fetch_new(
        &self,
        cursor: Option<&str>,
        store: &dyn ConnectorStoreView,
    ) -> std::result::Result<FetchBatch, ConnectorError>;

    fn normalize(&self, candidate: &ListingCandidate) -> ListingDraft;
}

// ---------------------------------------------------------------------------
// Job-facing store slices
// ---------------------------------------------------------------------------

#[async_trait]
pub trait CollectorStore: ConnectorStoreView {
    async fn enabled_sources(&self) -> Result<Vec<Source>>;
    async fn source_state(&self, source_id: Uuid) -> Result<Option<SourceState>>;
    async fn insert_raw_listings(&self, source_id: Uuid, rows: &[RawListingInsert])
        -> Result<u64>;
    async fn mark_source_success(
        &self,
        source_id: Uuid,
        cursor: Option<&str>,
        run_at: DateTime<Utc>,
    ) -> Result<()>;
    async fn mark_source_failure(
        &self,
        source_id: Uuid,
        error: &str,
        cursor: Option<&str>,
        run_at: DateTime<Utc>,
    ) -> Result<()>;
}

#[async_trait]
pub trait ProcessorStore: Send + Sync {
    async fn unprocessed_raw(&self, limit: i64) -> Result<Vec<RawListing>>;
    async fn source_by_id(&self, id: Uuid) -> Result<Option<Source>>;
    async fn upsert_listing_mark_processed(
        &self,
        raw_id: Uuid,
        listing: &NewListing,
        processed_at: DateTime<Utc>,
    ) -> Result<Uuid>;
}

#[async_trait]
pub trait NotifierStore: Send + Sync {
    async fn worker_state(&self, worker_name: &str) -> Result<Option<WorkerState>>;
    async fn listings_since(&self, since: DateTime<Utc>) -> Result<Vec<Listing>>;
    async fn active_filters_with_users(&self) -> Result<Vec<(Filter, User)>>;
    async fn notification_exists(&self, user_id: Uuid, listing_id: Uuid) -> Result<bool>;
    async fn record_notification(
        &self,
        user_id: Uuid,
        listing_id: Uuid,
        filter_id: Option<Uuid>,
        channel: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<bool>;
    async fn update_worker_state(
        &self,
        worker_name: &str,
        last_run_at: DateTime<Utc>,
        status: RunStatus,
        error: Option<&str>,
    ) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Chat transport
// ---------------------------------------------------------------------------

/// A delivery failure with enough context for the notifier's policy:
/// retryable failures defer to the next run, non-retryable photo failures
/// fall back to text.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub retryable: bool,
    pub image_error: bool,
    pub message: String,
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Channel label recorded with each notification (e.g. "telegram").
    fn channel(&self) -> &'static str;

    async fn send_text(&self, chat_id: i64, text: &str)
        -> std::result::Result<(), TransportError>;

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
    ) -> std::result::Result<(), TransportError>;
}

// ---------------------------------------------------------------------------
// Production implementations
// ---------------------------------------------------------------------------

#[async_trait]
impl ConnectorStoreView for Store {
    async fn enabled_cities(&self) -> Result<Vec<MonitoredCity>> {
        Store::enabled_cities(self).await
    }
}

#[async_trait]
impl CollectorStore for Store {
    async fn enabled_sources(&self) -> Result<Vec<Source>> {
        Store::enabled_sources(self).await
    }

    async fn source_state(&self, source_id: Uuid) -> Result<Option<SourceState>> {
        Store::source_state(self, source_id).await
    }

    async fn insert_raw_listings(
        &self,
        source_id: Uuid,
        rows: &[RawListingInsert],
    ) -> Result<u64> {
        Store::insert_raw_listings(self, source_id, rows).await
    }

    async fn mark_source_success(
        &self,
        source_id: Uuid,
        cursor: Option<&str>,
        run_at: DateTime<Utc>,
    ) -> Result<()> {
        Store::mark_source_success(self, source_id, cursor, run_at).await
    }

    async fn mark_source_failure(
        &self,
        source_id: Uuid,
        error: &str,
        cursor: Option<&str>,
        run_at: DateTime<Utc>,
    ) -> Result<()> {
        Store::mark_source_failure(self, source_id, error, cursor, run_at).await
    }
}

#[async_trait]
impl ProcessorStore for Store {
    async fn unprocessed_raw(&self, limit: i64) -> Result<Vec<RawListing>> {
        Store::unprocessed_raw(self, limit).await
    }

    async fn source_by_id(&self, id: Uuid) -> Result<Option<Source>> {
        Store::source_by_id(self, id).await
    }

    async fn upsert_listing_mark_processed(
        &self,
        raw_id: Uuid,
        listing: &NewListing,
        processed_at: DateTime<Utc>,
    ) -> Result<Uuid> {
        Store::upsert_listing_mark_processed(self, raw_id, listing, processed_at).await
    }
}

#[async_trait]
impl NotifierStore for Store {
    async fn worker_state(&self, worker_name: &str) -> Result<Option<WorkerState>> {
        Store::worker_state(self, worker_name).await
    }

    async fn listings_since(&self, since: DateTime<Utc>) -> Result<Vec<Listing>> {
        Store::listings_since(self, since).await
    }

    async fn active_filters_with_users(&self) -> Result<Vec<(Filter, User)>> {
        Store::active_filters_with_users(self).await
    }

    async fn notification_exists(&self, user_id: Uuid, listing_id: Uuid) -> Result<bool> {
        Store::notification_exists(self, user_id, listing_id).await
    }

    async fn record_notification(
        &self,
        user_id: Uuid,
        listing_id: Uuid,
        filter_id: Option<Uuid>,
        channel: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<bool> {
        Store::record_notification(self, user_id, listing_id, filter_id, channel, sent_at).await
    }

    async fn update_worker_state(
        &self,
        worker_name: &str,
        last_run_at: DateTime<Utc>,
        status: RunStatus,
        error: Option<&str>,
    ) -> Result<()> {
        Store::update_worker_state(self, worker_name, last_run_at, status, error).await
    }
}

#[async_trait]
impl ChatTransport for telegram_client::TelegramClient {
    fn channel(&self) -> &'static str {
        "telegram"
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> std::result::Result<(), TransportError> {
        self.send_message(chat_id, text, telegram_client::ParseMode::Html)
            .await
            .map(|_| ())
            .map_err(transport_error)
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
    ) -> std::result::Result<(), TransportError> {
        telegram_client::TelegramClient::send_photo(
            self,
            chat_id,
            photo_url,
            caption,
            telegram_client::ParseMode::Html,
        )
        .await
        .map(|_| ())
        .map_err(transport_error)
    }
}

fn transport_error(e: telegram_client::TelegramError) -> TransportError {
    TransportError {
        retryable: e.retryable(),
        image_error: e.is_image_error(),
        message: e.to_string(),
    }
}
