//! Reference marketplace connector.
//!
//! The cursor is a JSON envelope owned entirely by this module: round-robin
//! city index, circuit-breaker counters, and a FIFO set of recently seen
//! order ids. The collector stores it as opaque text.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use rentifier_common::types::{FetchBatch, ListingCandidate, ListingDraft, MonitoredCity};
use rentifier_common::{ConnectorError, ConnectorErrorKind, PricePeriod};
use rentifier_extract::normalize_city;
use yad2_client::{FeedItem, Yad2Client, Yad2Error};

use crate::traits::{Connector, ConnectorStoreView};

/// Failures before the circuit opens.
const CIRCUIT_THRESHOLD: u32 = 5;

/// How long an open circuit skips the network.
const CIRCUIT_COOLDOWN_MINUTES: i64 = 30;

/// FIFO capacity of the in-cursor dedup set. Database uniqueness is the
/// authoritative dedup; this only avoids re-inserting what we just saw.
const SEEN_CAP: usize = 500;

// ---------------------------------------------------------------------------
// Feed seam (scriptable in tests)
// ---------------------------------------------------------------------------

#[async_trait]
pub trait RentalFeed: Send + Sync {
    async fn search_rentals(&self, city_code: i32) -> Result<Vec<FeedItem>, Yad2Error>;
}

#[async_trait]
impl RentalFeed for Yad2Client {
    async fn search_rentals(&self, city_code: i32) -> Result<Vec<FeedItem>, Yad2Error> {
        Yad2Client::search_rentals(self, city_code).await
    }
}

// ---------------------------------------------------------------------------
// Cursor envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Yad2Cursor {
    #[serde(default)]
    last_city_index: usize,
    #[serde(default)]
    consecutive_failures: u32,
    #[serde(default)]
    circuit_open_until: Option<DateTime<Utc>>,
    #[serde(default)]
    seen_order_ids: VecDeque<String>,
}

impl Yad2Cursor {
    /// A cursor that fails to parse is treated as a first call.
    fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str(raw) {
            Ok(cursor) => cursor,
            Err(e) => {
                warn!(error = %e, "Unreadable cursor, starting fresh");
                Self::default()
            }
        }
    }

    fn encode(&self) -> String {
        serde_json::to_string(self).expect("cursor envelope serializes")
    }

    fn circuit_open(&self, now: DateTime<Utc>) -> bool {
        self.circuit_open_until.is_some_and(|until| now < until)
    }

    /// Count a failure; returns true when this one opened the circuit.
    /// A failure after the cooldown lapsed re-arms the breaker — the open
    /// time is stale by then, and only a success resets the counter.
    fn record_failure(&mut self, now: DateTime<Utc>) -> bool {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= CIRCUIT_THRESHOLD && !self.circuit_open(now) {
            self.circuit_open_until =
                Some(now + chrono::Duration::minutes(CIRCUIT_COOLDOWN_MINUTES));
            return true;
        }
        false
    }

    fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.circuit_open_until = None;
    }

    fn seen(&self, order_id: &str) -> bool {
        self.seen_order_ids.iter().any(|id| id == order_id)
    }

    fn remember(&mut self, order_id: String) {
        self.seen_order_ids.push_back(order_id);
        while self.seen_order_ids.len() > SEEN_CAP {
            self.seen_order_ids.pop_front();
        }
    }
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

pub struct Yad2Connector {
    feed: Arc<dyn RentalFeed>,
}

impl Yad2Connector {
    pub const SOURCE_NAME: &'static str = "yad2";

    pub fn new(base_url: Option<&str>) -> Self {
        Self {
            feed: Arc::new(Yad2Client::new(base_url)),
        }
    }

    /// Swap the HTTP client for a scripted feed.
    pub fn with_feed(feed: Arc<dyn RentalFeed>) -> Self {
        Self { feed }
    }
}

#[async_trait]
impl Connector for Yad2Connector {
    fn source_name(&self) -> &'static str {
        Self::SOURCE_NAME
    }

    async fn fetch_new(
        &self,
        raw_cursor: Option<&str>,
        store: &dyn ConnectorStoreView,
    ) -> Result<FetchBatch, ConnectorError> {
        let now = Utc::now();
        let mut cursor = Yad2Cursor::parse(raw_cursor);

        if cursor.circuit_open(now) {
            info!(
                open_until = ?cursor.circuit_open_until,
                "Circuit open, skipping fetch"
            );
            return Ok(FetchBatch {
                candidates: Vec::new(),
                next_cursor: raw_cursor.map(String::from),
            });
        }

        let cities = store.enabled_cities().await.map_err(|e| {
            ConnectorError::new(ConnectorErrorKind::Network, true, format!("city list: {e}"))
        })?;
        if cities.is_empty() {
            warn!("No enabled cities to crawl");
            return Ok(FetchBatch {
                candidates: Vec::new(),
                next_cursor: raw_cursor.map(String::from),
            });
        }

        let index = cursor.last_city_index % cities.len();
        let city = &cities[index];

        match self.feed.search_rentals(city.city_code).await {
            Err(e) => {
                let opened = cursor.record_failure(now);
                if opened {
                    warn!(
                        failures = cursor.consecutive_failures,
                        cooldown_minutes = CIRCUIT_COOLDOWN_MINUTES,
                        "circuit_opened"
                    );
                }
                // Position and seen-set stay where they were; only the
                // failure counters travel back in the error.
                Err(connector_error(e).with_cursor(cursor.encode()))
            }
            Ok(items) => {
                cursor.record_success();
                cursor.last_city_index = (index + 1) % cities.len();

                let mut candidates = Vec::new();
                let mut duplicates = 0usize;
                for item in items {
                    let order_id = item.order_id();
                    if cursor.seen(&order_id) {
                        duplicates += 1;
                        continue;
                    }
                    cursor.remember(order_id.clone());
                    candidates.push(candidate_from_item(order_id, item));
                }

                debug!(
                    city = %city.city_name,
                    new = candidates.len(),
                    duplicates,
                    "City page fetched"
                );
                Ok(FetchBatch {
                    candidates,
                    next_cursor: Some(cursor.encode()),
                })
            }
        }
    }

    fn normalize(&self, candidate: &ListingCandidate) -> ListingDraft {
        let item: FeedItem = match serde_json::from_value(serde_json::Value::Object(
            candidate.source_data.clone(),
        )) {
            Ok(item) => item,
            Err(e) => {
                debug!(item = %candidate.source_item_id, error = %e, "Opaque source data, using raw fields");
                return ListingDraft {
                    title: candidate.raw_title.clone(),
                    description: candidate.raw_description.clone(),
                    url: candidate.raw_url.clone(),
                    posted_at: candidate.raw_posted_at,
                    ..Default::default()
                };
            }
        };

        let floor = item.floor.as_deref().and_then(parse_floor);
        let mut tags = Vec::new();
        if let Some(tag) = item.property_type.as_deref().and_then(property_kind_tag) {
            tags.push(tag.to_string());
        }
        if let Some(tag) = item.condition.as_deref().and_then(condition_tag) {
            tags.push(tag.to_string());
        }
        if let Some(tag) = floor_bucket_tag(floor) {
            tags.push(tag.to_string());
        }
        if !item.images.is_empty() {
            tags.push("has_images".to_string());
        }

        let city = item
            .city
            .as_deref()
            .map(|raw| match normalize_city(raw) {
                Some(canonical) => canonical.to_string(),
                None => raw.trim().to_string(),
            });

        // Rent on this marketplace is always shekels per month.
        let price = item.price.as_deref().and_then(parse_display_price);
        let (currency, price_period) = if price.is_some() {
            (Some("ILS".to_string()), Some(PricePeriod::Monthly))
        } else {
            (None, None)
        };

        ListingDraft {
            title: join_titles(&item).unwrap_or_else(|| candidate.raw_title.clone()),
            description: item.search_text.clone().or_else(|| candidate.raw_description.clone()),
            price,
            currency,
            price_period,
            bedrooms: item.rooms,
            city,
            neighborhood: item.neighborhood.clone(),
            street: item.street.clone(),
            house_number: item.house_number.clone(),
            floor,
            square_meters: item.square_meters,
            property_type: item.property_type.clone(),
            latitude: item.coordinates.map(|c| c.latitude),
            longitude: item.coordinates.map(|c| c.longitude),
            image_url: item.images.first().cloned(),
            tags,
            url: item.item_url().unwrap_or_else(|| candidate.raw_url.clone()),
            posted_at: item
                .date_added
                .as_deref()
                .and_then(parse_feed_timestamp)
                .or(candidate.raw_posted_at),
        }
    }
}

// ---------------------------------------------------------------------------
// Item helpers
// ---------------------------------------------------------------------------

fn candidate_from_item(order_id: String, item: FeedItem) -> ListingCandidate {
    let raw_title = join_titles(&item).unwrap_or_else(|| order_id.clone());
    let raw_url = item
        .item_url()
        .unwrap_or_else(|| format!("https://www.yad2.co.il/item/{}", item.id));
    let raw_posted_at = item.date_added.as_deref().and_then(parse_feed_timestamp);

    let source_data = match serde_json::to_value(&item) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };

    ListingCandidate {
        source: Yad2Connector::SOURCE_NAME.to_string(),
        source_item_id: order_id,
        raw_title,
        raw_description: item.search_text.clone(),
        raw_url,
        raw_posted_at,
        source_data,
    }
}

fn join_titles(item: &FeedItem) -> Option<String> {
    let parts: Vec<&str> = [item.title_1.as_deref(), item.title_2.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// "5,500 ₪" → 5500. Any digit run works; an all-symbol string is None.
fn parse_display_price(raw: &str) -> Option<i64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Feed floors are display strings: "קרקע" is ground, otherwise a number.
fn parse_floor(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.contains("קרקע") {
        return Some(0);
    }
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn property_kind_tag(property_type: &str) -> Option<&'static str> {
    match property_type.trim() {
        "דירה" => Some("apartment"),
        "דירת גן" => Some("garden_apartment"),
        "פנטהאוז" | "גג/פנטהאוז" => Some("penthouse"),
        "יחידת דיור" => Some("housing_unit"),
        "סטודיו/לופט" => Some("studio"),
        "בית פרטי" | "קוטג'" => Some("house"),
        "דופלקס" => Some("duplex"),
        _ => None,
    }
}

fn condition_tag(condition: &str) -> Option<&'static str> {
    let trimmed = condition.trim();
    if trimmed.contains("חדש") {
        Some("new_condition")
    } else if trimmed.contains("משופץ") {
        Some("renovated")
    } else if trimmed.contains("שמור") || trimmed.contains("טוב") {
        Some("well_kept")
    } else {
        None
    }
}

fn floor_bucket_tag(floor: Option<i32>) -> Option<&'static str> {
    match floor? {
        0 => Some("ground_floor"),
        1..=3 => Some("low_floor"),
        _ => Some("high_floor"),
    }
}

/// Feed timestamps are local naive strings; treat them as UTC — the pipeline
/// only ever compares them to each other.
fn parse_feed_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn connector_error(e: Yad2Error) -> ConnectorError {
    let kind = match &e {
        Yad2Error::Network(_) => ConnectorErrorKind::Network,
        Yad2Error::Timeout => ConnectorErrorKind::Timeout,
        Yad2Error::Http { .. } => ConnectorErrorKind::Http,
        Yad2Error::Captcha => ConnectorErrorKind::Captcha,
        Yad2Error::Parse(_) => ConnectorErrorKind::Parse,
    };
    let mut err = ConnectorError::new(kind, e.retryable(), e.to_string());
    if let Some(status) = e.status() {
        err = err.with_status(status);
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::testing::MemoryStore;

    // --- scripted feed ---

    struct ScriptedFeed {
        script: Mutex<VecDeque<Result<Vec<FeedItem>, Yad2Error>>>,
        calls: Mutex<Vec<i32>>,
    }

    impl ScriptedFeed {
        fn new(script: Vec<Result<Vec<FeedItem>, Yad2Error>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn cities_called(&self) -> Vec<i32> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RentalFeed for ScriptedFeed {
        async fn search_rentals(&self, city_code: i32) -> Result<Vec<FeedItem>, Yad2Error> {
            self.calls.lock().unwrap().push(city_code);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn feed_item(order_id: i64) -> FeedItem {
        serde_json::from_value(serde_json::json!({
            "id": format!("tok{order_id}"),
            "ad_number": order_id,
            "title_1": "רוטשילד 12",
            "title_2": "דירה להשכרה",
            "price": "6,200 ₪",
            "rooms": 3.5,
            "square_meters": 82.0,
            "floor": "קרקע",
            "city": "תל אביב",
            "neighborhood": "לב העיר",
            "street": "רוטשילד",
            "house_number": "12",
            "property_type": "דירה",
            "condition": "משופץ",
            "coordinates": {"latitude": 32.063, "longitude": 34.774},
            "images": ["https://img.yad2.co.il/Pic/1.jpg"],
            "date_added": "2026-07-30 09:15:00",
            "link_token": format!("tok{order_id}")
        }))
        .unwrap()
    }

    fn store_with_cities() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_city("תל אביב", 5000, 10);
        store.add_city("חיפה", 4000, 5);
        store
    }

    fn network_err() -> Yad2Error {
        Yad2Error::Network("connection reset".into())
    }

    // --- fetch_new ---

    #[tokio::test]
    async fn first_fetch_starts_at_highest_priority_city() {
        let feed = Arc::new(ScriptedFeed::new(vec![Ok(vec![feed_item(1)])]));
        let connector = Yad2Connector::with_feed(feed.clone());
        let store = store_with_cities();

        let batch = connector.fetch_new(None, &store).await.unwrap();
        assert_eq!(batch.candidates.len(), 1);
        assert_eq!(feed.cities_called(), vec![5000]);

        let cursor: Yad2Cursor =
            serde_json::from_str(batch.next_cursor.as_deref().unwrap()).unwrap();
        assert_eq!(cursor.last_city_index, 1, "round-robin advanced");
        assert_eq!(cursor.consecutive_failures, 0);
    }

    #[tokio::test]
    async fn round_robin_wraps_across_invocations() {
        let feed = Arc::new(ScriptedFeed::new(vec![Ok(vec![]), Ok(vec![]), Ok(vec![])]));
        let connector = Yad2Connector::with_feed(feed.clone());
        let store = store_with_cities();

        let mut cursor: Option<String> = None;
        for _ in 0..3 {
            let batch = connector.fetch_new(cursor.as_deref(), &store).await.unwrap();
            cursor = batch.next_cursor;
        }
        assert_eq!(feed.cities_called(), vec![5000, 4000, 5000]);
    }

    #[tokio::test]
    async fn seen_order_ids_filtered_out() {
        let feed = Arc::new(ScriptedFeed::new(vec![
            Ok(vec![feed_item(1), feed_item(2)]),
            Ok(vec![feed_item(2), feed_item(3)]),
        ]));
        let connector = Yad2Connector::with_feed(feed);
        let store = store_with_cities();

        let first = connector.fetch_new(None, &store).await.unwrap();
        assert_eq!(first.candidates.len(), 2);

        let second = connector
            .fetch_new(first.next_cursor.as_deref(), &store)
            .await
            .unwrap();
        let ids: Vec<&str> = second
            .candidates
            .iter()
            .map(|c| c.source_item_id.as_str())
            .collect();
        assert_eq!(ids, vec!["3"], "already-seen order id filtered");
    }

    #[tokio::test]
    async fn failure_keeps_position_and_counts_up() {
        let feed = Arc::new(ScriptedFeed::new(vec![Err(network_err())]));
        let connector = Yad2Connector::with_feed(feed);
        let store = store_with_cities();

        let err = connector.fetch_new(None, &store).await.unwrap_err();
        assert!(err.retryable);
        let cursor: Yad2Cursor = serde_json::from_str(err.cursor.as_deref().unwrap()).unwrap();
        assert_eq!(cursor.consecutive_failures, 1);
        assert_eq!(cursor.last_city_index, 0, "position unchanged on failure");
        assert!(cursor.circuit_open_until.is_none());
    }

    #[tokio::test]
    async fn fifth_failure_opens_circuit_and_sixth_run_skips_network() {
        let feed = Arc::new(ScriptedFeed::new(
            (0..6).map(|_| Err(network_err())).collect(),
        ));
        let connector = Yad2Connector::with_feed(feed.clone());
        let store = store_with_cities();

        let mut cursor: Option<String> = None;
        for _ in 0..5 {
            let err = connector.fetch_new(cursor.as_deref(), &store).await.unwrap_err();
            cursor = err.cursor;
        }

        let parsed: Yad2Cursor = serde_json::from_str(cursor.as_deref().unwrap()).unwrap();
        assert_eq!(parsed.consecutive_failures, 5);
        let open_until = parsed.circuit_open_until.expect("circuit open");
        let expected = Utc::now() + chrono::Duration::minutes(CIRCUIT_COOLDOWN_MINUTES);
        assert!((open_until - expected).num_seconds().abs() < 10);

        // Sixth run: no HTTP call, empty batch, cursor handed back unchanged.
        let batch = connector.fetch_new(cursor.as_deref(), &store).await.unwrap();
        assert!(batch.candidates.is_empty());
        assert_eq!(batch.next_cursor, cursor);
        assert_eq!(feed.call_count(), 5);

        // Past the cooldown boundary the network is probed again, and the
        // still-failing source re-opens the circuit for another window.
        let mut expired = parsed.clone();
        expired.circuit_open_until = Some(Utc::now() - chrono::Duration::minutes(1));
        let err = connector
            .fetch_new(Some(&expired.encode()), &store)
            .await
            .unwrap_err();
        assert_eq!(feed.call_count(), 6, "cooldown expiry allows a live probe");
        let rearmed: Yad2Cursor = serde_json::from_str(err.cursor.as_deref().unwrap()).unwrap();
        assert_eq!(rearmed.consecutive_failures, 6);
        let reopened = rearmed.circuit_open_until.expect("circuit re-armed");
        let expected = Utc::now() + chrono::Duration::minutes(CIRCUIT_COOLDOWN_MINUTES);
        assert!((reopened - expected).num_seconds().abs() < 10);
    }

    #[tokio::test]
    async fn failure_after_cooldown_rearms_circuit() {
        let cursor = Yad2Cursor {
            last_city_index: 1,
            consecutive_failures: 5,
            circuit_open_until: Some(Utc::now() - chrono::Duration::minutes(1)),
            seen_order_ids: VecDeque::new(),
        };
        let feed = Arc::new(ScriptedFeed::new(vec![Err(network_err())]));
        let connector = Yad2Connector::with_feed(feed.clone());
        let store = store_with_cities();

        let err = connector
            .fetch_new(Some(&cursor.encode()), &store)
            .await
            .unwrap_err();
        assert_eq!(feed.call_count(), 1);

        let next: Yad2Cursor = serde_json::from_str(err.cursor.as_deref().unwrap()).unwrap();
        assert_eq!(next.consecutive_failures, 6);
        assert_eq!(next.last_city_index, 1, "position unchanged on failure");
        let reopened = next.circuit_open_until.expect("circuit re-armed");
        let expected = Utc::now() + chrono::Duration::minutes(CIRCUIT_COOLDOWN_MINUTES);
        assert!(
            (reopened - expected).num_seconds().abs() < 10,
            "stale open time replaced with a fresh cooldown window"
        );
    }

    #[tokio::test]
    async fn success_after_cooldown_resets_counters() {
        let cursor = Yad2Cursor {
            last_city_index: 1,
            consecutive_failures: 5,
            circuit_open_until: Some(Utc::now() - chrono::Duration::minutes(1)),
            seen_order_ids: VecDeque::new(),
        };
        let feed = Arc::new(ScriptedFeed::new(vec![Ok(vec![feed_item(9)])]));
        let connector = Yad2Connector::with_feed(feed);
        let store = store_with_cities();

        let batch = connector
            .fetch_new(Some(&cursor.encode()), &store)
            .await
            .unwrap();
        let next: Yad2Cursor =
            serde_json::from_str(batch.next_cursor.as_deref().unwrap()).unwrap();
        assert_eq!(next.consecutive_failures, 0);
        assert!(next.circuit_open_until.is_none());
    }

    #[tokio::test]
    async fn unreadable_cursor_starts_fresh() {
        let feed = Arc::new(ScriptedFeed::new(vec![Ok(vec![])]));
        let connector = Yad2Connector::with_feed(feed.clone());
        let store = store_with_cities();

        let batch = connector.fetch_new(Some("not json"), &store).await.unwrap();
        assert!(batch.next_cursor.is_some());
        assert_eq!(feed.cities_called(), vec![5000]);
    }

    #[test]
    fn seen_set_is_bounded_fifo() {
        let mut cursor = Yad2Cursor::default();
        for i in 0..(SEEN_CAP + 20) {
            cursor.remember(i.to_string());
        }
        assert_eq!(cursor.seen_order_ids.len(), SEEN_CAP);
        assert!(!cursor.seen("0"), "oldest entries evicted");
        assert!(cursor.seen(&(SEEN_CAP + 19).to_string()));
    }

    // --- normalize ---

    #[test]
    fn normalize_maps_structured_fields() {
        let connector = Yad2Connector::with_feed(Arc::new(ScriptedFeed::new(vec![])));
        let candidate = candidate_from_item("99".to_string(), feed_item(99));

        let draft = connector.normalize(&candidate);
        assert_eq!(draft.price, Some(6200));
        assert_eq!(draft.currency.as_deref(), Some("ILS"));
        assert_eq!(draft.price_period, Some(PricePeriod::Monthly));
        assert_eq!(draft.bedrooms, Some(3.5));
        assert_eq!(draft.city.as_deref(), Some("תל אביב"));
        assert_eq!(draft.neighborhood.as_deref(), Some("לב העיר"));
        assert_eq!(draft.street.as_deref(), Some("רוטשילד"));
        assert_eq!(draft.house_number.as_deref(), Some("12"));
        assert_eq!(draft.floor, Some(0));
        assert_eq!(draft.square_meters, Some(82.0));
        assert_eq!(draft.property_type.as_deref(), Some("דירה"));
        assert_eq!(draft.latitude, Some(32.063));
        assert_eq!(
            draft.image_url.as_deref(),
            Some("https://img.yad2.co.il/Pic/1.jpg")
        );
        assert_eq!(
            draft.tags,
            vec!["apartment", "renovated", "ground_floor", "has_images"]
        );
        assert_eq!(draft.url, "https://www.yad2.co.il/item/tok99");
        assert!(draft.posted_at.is_some());
    }

    #[test]
    fn normalize_is_total_on_opaque_source_data() {
        let connector = Yad2Connector::with_feed(Arc::new(ScriptedFeed::new(vec![])));
        let candidate = ListingCandidate {
            source: "yad2".to_string(),
            source_item_id: "x".to_string(),
            raw_title: "כותרת".to_string(),
            raw_description: Some("תיאור".to_string()),
            raw_url: "https://example.com/x".to_string(),
            raw_posted_at: None,
            source_data: serde_json::Map::new(),
        };

        let draft = connector.normalize(&candidate);
        assert_eq!(draft.title, "כותרת");
        assert_eq!(draft.url, "https://example.com/x");
        assert_eq!(draft.price, None);
    }

    // --- helpers ---

    #[test]
    fn display_price_parsing() {
        assert_eq!(parse_display_price("5,500 ₪"), Some(5500));
        assert_eq!(parse_display_price("₪1200"), Some(1200));
        assert_eq!(parse_display_price("לא צוין מחיר"), None);
    }

    #[test]
    fn floor_parsing_and_buckets() {
        assert_eq!(parse_floor("קרקע"), Some(0));
        assert_eq!(parse_floor("3"), Some(3));
        assert_eq!(parse_floor("קומה 7"), Some(7));
        assert_eq!(parse_floor("מרתף"), None);

        assert_eq!(floor_bucket_tag(Some(0)), Some("ground_floor"));
        assert_eq!(floor_bucket_tag(Some(2)), Some("low_floor"));
        assert_eq!(floor_bucket_tag(Some(8)), Some("high_floor"));
        assert_eq!(floor_bucket_tag(None), None);
    }

    #[test]
    fn condition_buckets() {
        assert_eq!(condition_tag("חדש מקבלן"), Some("new_condition"));
        assert_eq!(condition_tag("משופץ"), Some("renovated"));
        assert_eq!(condition_tag("שמור"), Some("well_kept"));
        assert_eq!(condition_tag("דורש שיפוץ"), None);
    }

    #[test]
    fn feed_timestamp_parsing() {
        let ts = parse_feed_timestamp("2026-07-30 09:15:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-07-30T09:15:00+00:00");
        assert!(parse_feed_timestamp("yesterday").is_none());
    }
}
