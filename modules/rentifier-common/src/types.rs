use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Run status (shared by source states and worker states) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Ok,
    Error,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Ok => write!(f, "ok"),
            RunStatus::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ok" => Ok(Self::Ok),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown RunStatus: {other}")),
        }
    }
}

// --- Price period ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePeriod {
    Monthly,
    Weekly,
    Daily,
}

impl std::fmt::Display for PricePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricePeriod::Monthly => write!(f, "monthly"),
            PricePeriod::Weekly => write!(f, "weekly"),
            PricePeriod::Daily => write!(f, "daily"),
        }
    }
}

impl std::str::FromStr for PricePeriod {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "weekly" => Ok(Self::Weekly),
            "daily" => Ok(Self::Daily),
            other => Err(format!("unknown PricePeriod: {other}")),
        }
    }
}

// --- Marketplace integrations ---

/// A marketplace integration. Seeded by the operator; rows are never deleted
/// while raw or canonical listings reference them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: Uuid,
    pub name: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-source collector state. The cursor is opaque bytes produced and
/// consumed only by the owning connector; the collector never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceState {
    pub source_id: Uuid,
    pub cursor: Option<String>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_status: Option<RunStatus>,
    pub last_error: Option<String>,
}

/// An operator-curated city that city-paged connectors iterate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoredCity {
    pub id: Uuid,
    pub city_name: String,
    pub city_code: i32,
    pub enabled: bool,
    pub priority: i32,
}

// --- Raw and canonical listings ---

/// A raw candidate exactly as the collector received it. `raw_json` holds the
/// full candidate blob; `processed_at` is set by the processor only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListing {
    pub id: Uuid,
    pub source_id: Uuid,
    pub source_item_id: String,
    pub url: String,
    pub raw_json: String,
    pub fetched_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// The canonical, deduplicated listing row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub source_id: Uuid,
    pub source_item_id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub price_period: Option<PricePeriod>,
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
    pub tags: Vec<String>,
    pub relevance_score: Option<f32>,
    pub url: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub ingested_at: DateTime<Utc>,
}

impl Listing {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Input for the canonical upsert. Identical to [`Listing`] minus the
/// store-owned columns (`id`, `ingested_at`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewListing {
    pub source_id: Uuid,
    pub source_item_id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub price_period: Option<PricePeriod>,
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
    pub tags: Vec<String>,
    pub relevance_score: Option<f32>,
    pub url: String,
    pub posted_at: Option<DateTime<Utc>>,
}

// --- Connector exchange types ---

/// A source's raw-but-structured view of a listing, as emitted by
/// `fetch_new`, before normalization. `source_data` preserves the upstream
/// item verbatim so `normalize` can read structured fields without
/// re-fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingCandidate {
    pub source: String,
    pub source_item_id: String,
    pub raw_title: String,
    #[serde(default)]
    pub raw_description: Option<String>,
    pub raw_url: String,
    #[serde(default)]
    pub raw_posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_data: serde_json::Map<String, serde_json::Value>,
}

/// A partially populated canonical listing produced by a connector's
/// `normalize`. The processor overlays rule-based extraction on top.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingDraft {
    pub title: String,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub price_period: Option<PricePeriod>,
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
    pub tags: Vec<String>,
    pub url: String,
    pub posted_at: Option<DateTime<Utc>>,
}

/// The result of one `fetch_new` call: new candidates plus the cursor to
/// persist once they are safely stored.
#[derive(Debug, Clone, Default)]
pub struct FetchBatch {
    pub candidates: Vec<ListingCandidate>,
    pub next_cursor: Option<String>,
}

// --- Users and filters ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub chat_id: i64,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A saved search. `None` / empty list means "no constraint on this
/// dimension". Owned by the chat UI; the notifier only reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_bedrooms: Option<f64>,
    pub max_bedrooms: Option<f64>,
    pub cities: Vec<String>,
    pub neighborhoods: Vec<String>,
    pub keywords: Vec<String>,
    pub must_have_tags: Vec<String>,
    pub exclude_tags: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Default for Filter {
    /// An unconstrained, enabled filter — every dimension passes trivially.
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            name: String::new(),
            min_price: None,
            max_price: None,
            min_bedrooms: None,
            max_bedrooms: None,
            cities: Vec::new(),
            neighborhoods: Vec::new(),
            keywords: Vec::new(),
            must_have_tags: Vec::new(),
            exclude_tags: Vec::new(),
            enabled: true,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }
}

// --- Notification bookkeeping ---

/// At most one row per (user, listing), ever. The primary key is the
/// delivery-dedup mechanism.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSent {
    pub user_id: Uuid,
    pub listing_id: Uuid,
    pub filter_id: Option<Uuid>,
    pub sent_at: DateTime<Utc>,
    pub channel: String,
}

/// The notifier's watermark row (and, generically, any job's last-run
/// record keyed by worker name).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerState {
    pub worker_name: String,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_status: Option<RunStatus>,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_status_roundtrip() {
        for s in [RunStatus::Ok, RunStatus::Error] {
            let text = s.to_string();
            assert_eq!(text.parse::<RunStatus>().unwrap(), s);
        }
        assert!("running".parse::<RunStatus>().is_err());
    }

    #[test]
    fn price_period_roundtrip() {
        for p in [PricePeriod::Monthly, PricePeriod::Weekly, PricePeriod::Daily] {
            let text = p.to_string();
            assert_eq!(text.parse::<PricePeriod>().unwrap(), p);
        }
    }

    #[test]
    fn candidate_json_preserves_source_data() {
        let mut source_data = serde_json::Map::new();
        source_data.insert("rooms".to_string(), serde_json::json!(3.5));
        let candidate = ListingCandidate {
            source: "yad2".to_string(),
            source_item_id: "123".to_string(),
            raw_title: "דירה בפלורנטין".to_string(),
            raw_description: None,
            raw_url: "https://example.com/item/123".to_string(),
            raw_posted_at: None,
            source_data,
        };
        let json = serde_json::to_string(&candidate).unwrap();
        let back: ListingCandidate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.source_data.get("rooms"), Some(&serde_json::json!(3.5)));
    }

    #[test]
    fn listing_has_tag() {
        let listing = Listing {
            id: Uuid::new_v4(),
            source_id: Uuid::new_v4(),
            source_item_id: "a".to_string(),
            title: "t".to_string(),
            description: None,
            price: None,
            currency: None,
            price_period: None,
            bedrooms: None,
            city: None,
            neighborhood: None,
            street: None,
            house_number: None,
            floor: None,
            square_meters: None,
            property_type: None,
            latitude: None,
            longitude: None,
            image_url: None,
            tags: vec!["parking".to_string()],
            relevance_score: None,
            url: "u".to_string(),
            posted_at: None,
            ingested_at: Utc::now(),
        };
        assert!(listing.has_tag("parking"));
        assert!(!listing.has_tag("balcony"));
    }
}
