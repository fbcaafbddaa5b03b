//! Processor job: normalize raw candidates through their owning connector,
//! overlay rule-based extraction, upsert the canonical row.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use rentifier_common::types::{ListingCandidate, ListingDraft, NewListing, RawListing};
use rentifier_common::ProcessorSummary;
use rentifier_extract::{extract_all, Extraction};
use uuid::Uuid;

use crate::cancel;
use crate::registry::Registry;
use crate::traits::ProcessorStore;

pub struct Processor<S> {
    store: Arc<S>,
    registry: Arc<Registry>,
    batch_size: i64,
    cancelled: Arc<AtomicBool>,
}

impl<S: ProcessorStore> Processor<S> {
    pub fn new(
        store: Arc<S>,
        registry: Arc<Registry>,
        batch_size: i64,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            store,
            registry,
            batch_size,
            cancelled,
        }
    }

    pub async fn run(&self) -> Result<ProcessorSummary> {
        let batch = self.store.unprocessed_raw(self.batch_size).await?;
        let mut summary = ProcessorSummary::default();

        for raw in batch {
            if cancel::cancelled(&self.cancelled) {
                info!("Cancelled, leaving remaining items for the next run");
                break;
            }
            match self.process_one(&raw).await {
                Ok(listing_id) => {
                    debug!(raw_id = %raw.id, listing_id = %listing_id, "Item processed");
                    summary.processed += 1;
                }
                Err(e) => {
                    // The raw row stays unprocessed so a later run can
                    // retry once the cause (e.g. a missing connector) is fixed.
                    warn!(raw_id = %raw.id, error = %e, "Item failed");
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {e:#}", raw.id));
                }
            }
        }

        Ok(summary)
    }

    async fn process_one(&self, raw: &RawListing) -> Result<Uuid> {
        let candidate: ListingCandidate =
            serde_json::from_str(&raw.raw_json).context("malformed raw candidate")?;

        let source = self
            .store
            .source_by_id(raw.source_id)
            .await?
            .ok_or_else(|| anyhow!("unknown source id {}", raw.source_id))?;
        let connector = self
            .registry
            .get(&source.name)
            .ok_or_else(|| anyhow!("no connector registered for source '{}'", source.name))?;

        let draft = connector.normalize(&candidate);
        let extraction = extract_all(
            &candidate.raw_title,
            candidate.raw_description.as_deref().unwrap_or(""),
        );

        let listing = compose_listing(raw.source_id, &candidate, draft, &extraction);
        self.store
            .upsert_listing_mark_processed(raw.id, &listing, Utc::now())
            .await
    }
}

/// Merge the connector draft with rule-based extraction.
///
/// Deterministic priority: for price, currency, period, bedrooms, city and
/// neighborhood the extracted value wins over the draft. Structural fields
/// only ever come from the draft. Tag sets union, extraction first.
pub(crate) fn compose_listing(
    source_id: Uuid,
    candidate: &ListingCandidate,
    draft: ListingDraft,
    extraction: &Extraction,
) -> NewListing {
    let (price, currency, price_period) = match &extraction.price {
        Some(p) => (
            Some(p.amount),
            Some(p.currency.clone()),
            p.period.or(draft.price_period),
        ),
        None => (draft.price, draft.currency, draft.price_period),
    };

    let (city, neighborhood) = match &extraction.location {
        Some(location) => (
            Some(location.city.clone()),
            location.neighborhood.clone().or(draft.neighborhood),
        ),
        None => (draft.city, draft.neighborhood),
    };

    let mut tags = extraction.tags.clone();
    for tag in draft.tags {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    let title = if draft.title.is_empty() {
        candidate.raw_title.clone()
    } else {
        draft.title
    };

    NewListing {
        source_id,
        source_item_id: candidate.source_item_id.clone(),
        title,
        description: draft.description.or_else(|| candidate.raw_description.clone()),
        price,
        currency,
        price_period,
        bedrooms: extraction.rooms.or(draft.bedrooms),
        city,
        neighborhood,
        street: draft.street,
        house_number: draft.house_number,
        floor: draft.floor,
        square_meters: draft.square_meters,
        property_type: draft.property_type,
        latitude: draft.latitude,
        longitude: draft.longitude,
        image_url: draft.image_url,
        tags,
        relevance_score: (extraction.overall_confidence > 0.0)
            .then_some(extraction.overall_confidence),
        url: if draft.url.is_empty() {
            candidate.raw_url.clone()
        } else {
            draft.url
        },
        posted_at: draft.posted_at.or(candidate.raw_posted_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, description: &str) -> ListingCandidate {
        ListingCandidate {
            source: "yad2".to_string(),
            source_item_id: "1".to_string(),
            raw_title: title.to_string(),
            raw_description: Some(description.to_string()),
            raw_url: "https://example.com/1".to_string(),
            raw_posted_at: None,
            source_data: serde_json::Map::new(),
        }
    }

    #[test]
    fn extracted_price_wins_over_draft() {
        let c = candidate("דירה בחיפה", "רק 4,800 ₪ לחודש");
        let extraction = extract_all(&c.raw_title, c.raw_description.as_deref().unwrap());
        let draft = ListingDraft {
            title: "draft".to_string(),
            price: Some(9999),
            currency: Some("ILS".to_string()),
            url: "https://example.com/1".to_string(),
            ..Default::default()
        };

        let listing = compose_listing(Uuid::new_v4(), &c, draft, &extraction);
        assert_eq!(listing.price, Some(4800));
        assert_eq!(listing.city.as_deref(), Some("חיפה"));
    }

    #[test]
    fn draft_fills_when_extraction_silent() {
        let c = candidate("שקט ומואר", "ללא פרטים");
        let extraction = extract_all(&c.raw_title, c.raw_description.as_deref().unwrap());
        let draft = ListingDraft {
            title: "שקט ומואר".to_string(),
            price: Some(5200),
            currency: Some("ILS".to_string()),
            city: Some("רמת גן".to_string()),
            floor: Some(4),
            url: "https://example.com/1".to_string(),
            ..Default::default()
        };

        let listing = compose_listing(Uuid::new_v4(), &c, draft, &extraction);
        assert_eq!(listing.price, Some(5200));
        assert_eq!(listing.city.as_deref(), Some("רמת גן"));
        assert_eq!(listing.floor, Some(4));
        assert_eq!(listing.relevance_score, None, "no extraction signals");
    }

    #[test]
    fn tag_sets_union_without_duplicates() {
        let c = candidate("דירה עם חניה", "");
        let extraction = extract_all(&c.raw_title, "");
        let draft = ListingDraft {
            tags: vec!["parking".to_string(), "has_images".to_string()],
            url: "u".to_string(),
            ..Default::default()
        };

        let listing = compose_listing(Uuid::new_v4(), &c, draft, &extraction);
        assert_eq!(listing.tags, vec!["parking", "has_images"]);
    }

    #[test]
    fn relevance_score_from_confidence() {
        let c = candidate("דירה בתל אביב", "5,000 ₪ לחודש");
        let extraction = extract_all(&c.raw_title, c.raw_description.as_deref().unwrap());
        let listing = compose_listing(
            Uuid::new_v4(),
            &c,
            ListingDraft {
                url: "u".to_string(),
                ..Default::default()
            },
            &extraction,
        );
        assert_eq!(listing.relevance_score, Some(0.8), "min(price 0.9, city 0.8)");
    }
}
