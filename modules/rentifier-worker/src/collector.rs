//! Collector job: pull new candidates from every enabled source and
//! persist them raw. One source failing never stops the next one.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use rentifier_common::types::Source;
use rentifier_common::{CollectorSummary, ConnectorError};
use rentifier_store::RawListingInsert;

use crate::cancel;
use crate::registry::Registry;
use crate::traits::{CollectorStore, Connector};

pub struct Collector<S> {
    store: Arc<S>,
    registry: Arc<Registry>,
    cancelled: Arc<AtomicBool>,
}

impl<S: CollectorStore> Collector<S> {
    pub fn new(store: Arc<S>, registry: Arc<Registry>, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            store,
            registry,
            cancelled,
        }
    }

    pub async fn run(&self) -> Result<CollectorSummary> {
        let sources = self.store.enabled_sources().await?;
        let mut summary = CollectorSummary {
            total_sources: sources.len() as u32,
            ..Default::default()
        };

        for source in sources {
            if cancel::cancelled(&self.cancelled) {
                info!("Cancelled, leaving remaining sources for the next run");
                break;
            }

            let Some(connector) = self.registry.get(&source.name) else {
                warn!(source = %source.name, "No connector registered, skipping");
                summary.skipped += 1;
                continue;
            };

            match self.collect_source(&source, connector.as_ref()).await {
                Ok(fetched) => {
                    summary.success += 1;
                    summary.total_fetched += fetched;
                }
                Err(e) => {
                    summary.error += 1;
                    summary.errors.push(format!("{}: {e:#}", source.name));
                }
            }
        }

        Ok(summary)
    }

    /// One source end to end: read cursor, fetch, persist candidates, then
    /// — and only then — advance the cursor.
    async fn collect_source(&self, source: &Source, connector: &dyn Connector) -> Result<u64> {
        let state = self.store.source_state(source.id).await?;
        let cursor = state.and_then(|s| s.cursor);

        let batch = match connector.fetch_new(cursor.as_deref(), self.store.as_ref()).await {
            Ok(batch) => batch,
            Err(e) => {
                self.record_fetch_failure(source, &e).await;
                return Err(e.into());
            }
        };

        let fetched = batch.candidates.len() as u64;
        let rows = batch
            .candidates
            .iter()
            .map(|candidate| {
                Ok(RawListingInsert {
                    source_item_id: candidate.source_item_id.clone(),
                    url: candidate.raw_url.clone(),
                    raw_json: serde_json::to_string(candidate)
                        .context("serialize candidate")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let inserted = self.store.insert_raw_listings(source.id, &rows).await?;
        self.store
            .mark_source_success(source.id, batch.next_cursor.as_deref(), Utc::now())
            .await?;

        info!(
            source = %source.name,
            fetched,
            inserted,
            duplicates = fetched - inserted,
            "Source collected"
        );
        Ok(fetched)
    }

    /// Best-effort error state write; the connector's updated envelope
    /// (circuit counters) travels along when it sent one.
    async fn record_fetch_failure(&self, source: &Source, error: &ConnectorError) {
        warn!(
            source = %source.name,
            kind = %error.kind,
            retryable = error.retryable,
            error = %error,
            "Fetch failed"
        );
        if let Err(e) = self
            .store
            .mark_source_failure(
                source.id,
                &error.to_string(),
                error.cursor.as_deref(),
                Utc::now(),
            )
            .await
        {
            warn!(source = %source.name, error = %e, "Failed to record source error state");
        }
    }
}
