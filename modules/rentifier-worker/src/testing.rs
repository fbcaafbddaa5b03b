// Test mocks for the pipeline jobs.
//
// Mocks matching the trait boundaries:
// - MemoryStore — stateful in-memory store implementing every job-facing
//   store trait, with snapshot accessors for assertions
// - MockConnector (Connector) — scripted fetch results, field-copy normalize
// - MockTransport (ChatTransport) — records sends, scriptable failures
//
// Plus helpers for constructing listings and candidates.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use rentifier_common::types::{
    FetchBatch, Filter, Listing, ListingCandidate, ListingDraft, MonitoredCity, NewListing,
    NotificationSent, RawListing, RunStatus, Source, SourceState, User, WorkerState,
};
use rentifier_common::ConnectorError;
use rentifier_store::RawListingInsert;

use crate::traits::{
    ChatTransport, CollectorStore, Connector, ConnectorStoreView, NotifierStore, ProcessorStore,
    TransportError,
};

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Inner {
    sources: Vec<Source>,
    states: HashMap<Uuid, SourceState>,
    cities: Vec<MonitoredCity>,
    raw: Vec<RawListing>,
    listings: Vec<Listing>,
    filters: Vec<(Filter, User)>,
    notifications: Vec<NotificationSent>,
    workers: HashMap<String, WorkerState>,
}

/// In-memory store. Filters come back in insertion order, which stands in
/// for "filter id ascending".
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- seeding ---

    pub fn add_source(&self, name: &str) -> Source {
        let source = Source {
            id: Uuid::new_v4(),
            name: name.to_string(),
            enabled: true,
            created_at: Utc::now(),
        };
        self.inner.lock().unwrap().sources.push(source.clone());
        source
    }

    pub fn add_city(&self, name: &str, code: i32, priority: i32) -> MonitoredCity {
        let city = MonitoredCity {
            id: Uuid::new_v4(),
            city_name: name.to_string(),
            city_code: code,
            enabled: true,
            priority,
        };
        self.inner.lock().unwrap().cities.push(city.clone());
        city
    }

    pub fn add_user(&self, chat_id: i64) -> User {
        User {
            id: Uuid::new_v4(),
            chat_id,
            display_name: None,
            created_at: Utc::now(),
        }
    }

    pub fn add_filter(&self, user: &User, filter: Filter) -> Filter {
        let filter = Filter {
            id: Uuid::new_v4(),
            user_id: user.id,
            enabled: true,
            ..filter
        };
        self.inner
            .lock()
            .unwrap()
            .filters
            .push((filter.clone(), user.clone()));
        filter
    }

    pub fn add_listing(&self, listing: Listing) {
        self.inner.lock().unwrap().listings.push(listing);
    }

    pub fn set_worker_run_at(&self, worker_name: &str, last_run_at: DateTime<Utc>) {
        self.inner.lock().unwrap().workers.insert(
            worker_name.to_string(),
            WorkerState {
                worker_name: worker_name.to_string(),
                last_run_at: Some(last_run_at),
                last_status: Some(RunStatus::Ok),
                last_error: None,
            },
        );
    }

    // --- snapshots ---

    pub fn raw_listings(&self) -> Vec<RawListing> {
        self.inner.lock().unwrap().raw.clone()
    }

    pub fn listings(&self) -> Vec<Listing> {
        self.inner.lock().unwrap().listings.clone()
    }

    pub fn state_of(&self, source_id: Uuid) -> Option<SourceState> {
        self.inner.lock().unwrap().states.get(&source_id).cloned()
    }

    pub fn cursor_of(&self, source_id: Uuid) -> Option<String> {
        self.state_of(source_id).and_then(|s| s.cursor)
    }

    pub fn notifications(&self) -> Vec<NotificationSent> {
        self.inner.lock().unwrap().notifications.clone()
    }

    pub fn worker(&self, worker_name: &str) -> Option<WorkerState> {
        self.inner.lock().unwrap().workers.get(worker_name).cloned()
    }
}

#[async_trait]
impl ConnectorStoreView for MemoryStore {
    async fn enabled_cities(&self) -> Result<Vec<MonitoredCity>> {
        let mut cities: Vec<MonitoredCity> = self
            .inner
            .lock()
            .unwrap()
            .cities
            .iter()
            .filter(|c| c.enabled)
            .cloned()
            .collect();
        cities.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(cities)
    }
}

#[async_trait]
impl CollectorStore for MemoryStore {
    async fn enabled_sources(&self) -> Result<Vec<Source>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .sources
            .iter()
            .filter(|s| s.enabled)
            .cloned()
            .collect())
    }

    async fn source_state(&self, source_id: Uuid) -> Result<Option<SourceState>> {
        Ok(self.state_of(source_id))
    }

    async fn insert_raw_listings(
        &self,
        source_id: Uuid,
        rows: &[RawListingInsert],
    ) -> Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        let mut written = 0u64;
        for row in rows {
            match inner
                .raw
                .iter_mut()
                .find(|r| r.source_id == source_id && r.source_item_id == row.source_item_id)
            {
                Some(existing) if existing.raw_json == row.raw_json => {}
                Some(existing) => {
                    existing.raw_json = row.raw_json.clone();
                    existing.url = row.url.clone();
                    existing.fetched_at = Utc::now();
                    existing.processed_at = None;
                    written += 1;
                }
                None => {
                    inner.raw.push(RawListing {
                        id: Uuid::new_v4(),
                        source_id,
                        source_item_id: row.source_item_id.clone(),
                        url: row.url.clone(),
                        raw_json: row.raw_json.clone(),
                        fetched_at: Utc::now(),
                        processed_at: None,
                    });
                    written += 1;
                }
            }
        }
        Ok(written)
    }

    async fn mark_source_success(
        &self,
        source_id: Uuid,
        cursor: Option<&str>,
        run_at: DateTime<Utc>,
    ) -> Result<()> {
        self.inner.lock().unwrap().states.insert(
            source_id,
            SourceState {
                source_id,
                cursor: cursor.map(String::from),
                last_run_at: Some(run_at),
                last_status: Some(RunStatus::Ok),
                last_error: None,
            },
        );
        Ok(())
    }

    async fn mark_source_failure(
        &self,
        source_id: Uuid,
        error: &str,
        cursor: Option<&str>,
        run_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let previous_cursor = inner.states.get(&source_id).and_then(|s| s.cursor.clone());
        inner.states.insert(
            source_id,
            SourceState {
                source_id,
                cursor: cursor.map(String::from).or(previous_cursor),
                last_run_at: Some(run_at),
                last_status: Some(RunStatus::Error),
                last_error: Some(error.to_string()),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl ProcessorStore for MemoryStore {
    async fn unprocessed_raw(&self, limit: i64) -> Result<Vec<RawListing>> {
        let mut batch: Vec<RawListing> = self
            .inner
            .lock()
            .unwrap()
            .raw
            .iter()
            .filter(|r| r.processed_at.is_none())
            .cloned()
            .collect();
        batch.sort_by_key(|r| r.fetched_at);
        batch.truncate(limit as usize);
        Ok(batch)
    }

    async fn source_by_id(&self, id: Uuid) -> Result<Option<Source>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .sources
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn upsert_listing_mark_processed(
        &self,
        raw_id: Uuid,
        listing: &NewListing,
        processed_at: DateTime<Utc>,
    ) -> Result<Uuid> {
        let mut inner = self.inner.lock().unwrap();

        let listing_id = match inner.listings.iter_mut().find(|l| {
            l.source_id == listing.source_id && l.source_item_id == listing.source_item_id
        }) {
            Some(existing) => {
                let id = existing.id;
                let ingested_at = existing.ingested_at;
                *existing = materialize(listing, id, ingested_at);
                id
            }
            None => {
                let id = Uuid::new_v4();
                inner.listings.push(materialize(listing, id, Utc::now()));
                id
            }
        };

        if let Some(raw) = inner.raw.iter_mut().find(|r| r.id == raw_id) {
            raw.processed_at = Some(processed_at);
        }
        Ok(listing_id)
    }
}

#[async_trait]
impl NotifierStore for MemoryStore {
    async fn worker_state(&self, worker_name: &str) -> Result<Option<WorkerState>> {
        Ok(self.worker(worker_name))
    }

    async fn listings_since(&self, since: DateTime<Utc>) -> Result<Vec<Listing>> {
        let mut listings: Vec<Listing> = self
            .inner
            .lock()
            .unwrap()
            .listings
            .iter()
            .filter(|l| l.ingested_at > since)
            .cloned()
            .collect();
        listings.sort_by_key(|l| std::cmp::Reverse(l.ingested_at));
        Ok(listings)
    }

    async fn active_filters_with_users(&self) -> Result<Vec<(Filter, User)>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .filters
            .iter()
            .filter(|(f, _)| f.enabled)
            .cloned()
            .collect())
    }

    async fn notification_exists(&self, user_id: Uuid, listing_id: Uuid) -> Result<bool> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .notifications
            .iter()
            .any(|n| n.user_id == user_id && n.listing_id == listing_id))
    }

    async fn record_notification(
        &self,
        user_id: Uuid,
        listing_id: Uuid,
        filter_id: Option<Uuid>,
        channel: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        let exists = inner
            .notifications
            .iter()
            .any(|n| n.user_id == user_id && n.listing_id == listing_id);
        if exists {
            return Ok(false);
        }
        inner.notifications.push(NotificationSent {
            user_id,
            listing_id,
            filter_id,
            sent_at,
            channel: channel.to_string(),
        });
        Ok(true)
    }

    async fn update_worker_state(
        &self,
        worker_name: &str,
        last_run_at: DateTime<Utc>,
        status: RunStatus,
        error: Option<&str>,
    ) -> Result<()> {
        self.inner.lock().unwrap().workers.insert(
            worker_name.to_string(),
            WorkerState {
                worker_name: worker_name.to_string(),
                last_run_at: Some(last_run_at),
                last_status: Some(status),
                last_error: error.map(String::from),
            },
        );
        Ok(())
    }
}

fn materialize(listing: &NewListing, id: Uuid, ingested_at: DateTime<Utc>) -> Listing {
    Listing {
        id,
        source_id: listing.source_id,
        source_item_id: listing.source_item_id.clone(),
        title: listing.title.clone(),
        description: listing.description.clone(),
        price: listing.price,
        currency: listing.currency.clone(),
        price_period: listing.price_period,
        bedrooms: listing.bedrooms,
        city: listing.city.clone(),
        neighborhood: listing.neighborhood.clone(),
        street: listing.street.clone(),
        house_number: listing.house_number.clone(),
        floor: listing.floor,
        square_meters: listing.square_meters,
        property_type: listing.property_type.clone(),
        latitude: listing.latitude,
        longitude: listing.longitude,
        image_url: listing.image_url.clone(),
        tags: listing.tags.clone(),
        relevance_score: listing.relevance_score,
        url: listing.url.clone(),
        posted_at: listing.posted_at,
        ingested_at,
    }
}

// ---------------------------------------------------------------------------
// MockConnector
// ---------------------------------------------------------------------------

/// Scripted connector: `fetch_new` pops the next result, an exhausted
/// script yields empty batches. `normalize` copies the raw fields and the
/// `price` key out of `source_data`.
pub struct MockConnector {
    name: &'static str,
    script: Mutex<Vec<std::result::Result<FetchBatch, ConnectorError>>>,
}

impl MockConnector {
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            script: Mutex::new(Vec::new()),
        }
    }

    pub fn on_fetch(self, result: std::result::Result<FetchBatch, ConnectorError>) -> Self {
        self.script.lock().unwrap().push(result);
        self
    }
}

#[async_trait]
impl Connector for MockConnector {
    fn source_name(&self) -> &'static str {
        self.name
    }

    async fn fetch_new(
        &self,
        cursor: Option<&str>,
        _store: &dyn ConnectorStoreView,
    ) -> std::result::Result<FetchBatch, ConnectorError> {
        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            return Ok(FetchBatch {
                candidates: Vec::new(),
                next_cursor: cursor.map(String::from),
            });
        }
        script.remove(0)
    }

    fn normalize(&self, candidate: &ListingCandidate) -> ListingDraft {
        let price = candidate.source_data.get("price").and_then(|v| v.as_i64());
        ListingDraft {
            title: candidate.raw_title.clone(),
            description: candidate.raw_description.clone(),
            price,
            currency: price.map(|_| "ILS".to_string()),
            url: candidate.raw_url.clone(),
            posted_at: candidate.raw_posted_at,
            ..Default::default()
        }
    }
}

/// A candidate the way MockConnector's marketplace would emit one.
pub fn candidate(item_id: &str, price: i64) -> ListingCandidate {
    let mut source_data = serde_json::Map::new();
    source_data.insert("price".to_string(), serde_json::json!(price));
    ListingCandidate {
        source: "mock".to_string(),
        source_item_id: item_id.to_string(),
        raw_title: format!("Listing {item_id}"),
        raw_description: None,
        raw_url: format!("https://market.example/item/{item_id}"),
        raw_posted_at: None,
        source_data,
    }
}

pub fn batch(candidates: Vec<ListingCandidate>, next_cursor: &str) -> FetchBatch {
    FetchBatch {
        candidates,
        next_cursor: Some(next_cursor.to_string()),
    }
}

// ---------------------------------------------------------------------------
// MockTransport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentKind {
    Photo,
    Text,
}

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: i64,
    pub kind: SentKind,
    pub text: String,
}

/// Records every send; photo/text sends can be scripted to fail.
#[derive(Default)]
pub struct MockTransport {
    sent: Mutex<Vec<SentMessage>>,
    photo_failure: Mutex<Option<bool>>,
    text_failure: Mutex<Option<bool>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every photo send fails; `retryable` picks the failure class.
    pub fn failing_photos(self, retryable: bool) -> Self {
        *self.photo_failure.lock().unwrap() = Some(retryable);
        self
    }

    /// Every text send fails; `retryable` picks the failure class.
    pub fn failing_texts(self, retryable: bool) -> Self {
        *self.text_failure.lock().unwrap() = Some(retryable);
        self
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    fn channel(&self) -> &'static str {
        "telegram"
    }

    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
    ) -> std::result::Result<(), TransportError> {
        if let Some(retryable) = *self.text_failure.lock().unwrap() {
            return Err(TransportError {
                retryable,
                image_error: false,
                message: "scripted text failure".to_string(),
            });
        }
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            kind: SentKind::Text,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        _photo_url: &str,
        caption: &str,
    ) -> std::result::Result<(), TransportError> {
        if let Some(retryable) = *self.photo_failure.lock().unwrap() {
            return Err(TransportError {
                retryable,
                image_error: !retryable,
                message: "scripted photo failure".to_string(),
            });
        }
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            kind: SentKind::Photo,
            text: caption.to_string(),
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Listing helpers
// ---------------------------------------------------------------------------

/// Knobs for a test listing; everything else gets a neutral default.
pub struct ListingSpec {
    pub title: &'static str,
    pub price: Option<i64>,
    pub bedrooms: Option<f64>,
    pub city: Option<&'static str>,
    pub neighborhood: Option<&'static str>,
    pub street: Option<&'static str>,
    pub house_number: Option<&'static str>,
    pub tags: &'static [&'static str],
    pub image_url: Option<&'static str>,
    pub ingested_at: Option<DateTime<Utc>>,
}

impl Default for ListingSpec {
    fn default() -> Self {
        Self {
            title: "דירה להשכרה",
            price: None,
            bedrooms: None,
            city: None,
            neighborhood: None,
            street: None,
            house_number: None,
            tags: &[],
            image_url: None,
            ingested_at: None,
        }
    }
}

pub fn listing_with(spec: ListingSpec) -> Listing {
    Listing {
        id: Uuid::new_v4(),
        source_id: Uuid::new_v4(),
        source_item_id: Uuid::new_v4().to_string(),
        title: spec.title.to_string(),
        description: None,
        price: spec.price,
        currency: spec.price.map(|_| "ILS".to_string()),
        price_period: None,
        bedrooms: spec.bedrooms,
        city: spec.city.map(String::from),
        neighborhood: spec.neighborhood.map(String::from),
        street: spec.street.map(String::from),
        house_number: spec.house_number.map(String::from),
        floor: None,
        square_meters: None,
        property_type: None,
        latitude: None,
        longitude: None,
        image_url: spec.image_url.map(String::from),
        tags: spec.tags.iter().map(|t| t.to_string()).collect(),
        relevance_score: None,
        url: "https://market.example/item/1".to_string(),
        posted_at: None,
        ingested_at: spec.ingested_at.unwrap_or_else(Utc::now),
    }
}
