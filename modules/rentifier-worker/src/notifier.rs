//! Notifier job: evaluate every enabled filter against listings newer than
//! the watermark, deliver matches, record each delivery exactly once.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use rentifier_common::types::{Listing, RunStatus, User};
use rentifier_common::NotifierSummary;
use uuid::Uuid;

use crate::cancel;
use crate::matcher::matches;
use crate::render::render_message;
use crate::traits::{ChatTransport, NotifierStore};

/// Watermark row name in `worker_states`.
pub const WORKER_NAME: &str = "notify";

/// First-run lookback window.
const FIRST_RUN_WINDOW_HOURS: i64 = 24;

pub struct Notifier<S, T> {
    store: Arc<S>,
    transport: Arc<T>,
    cancelled: Arc<AtomicBool>,
}

enum Delivery {
    Photo,
    TextFallback,
    TextOnly,
    /// Retryable transport failure — leave the pair unrecorded so the next
    /// run redrives it.
    Deferred,
    Failed,
}

impl<S: NotifierStore, T: ChatTransport> Notifier<S, T> {
    pub fn new(store: Arc<S>, transport: Arc<T>, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            store,
            transport,
            cancelled,
        }
    }

    pub async fn run(&self) -> Result<NotifierSummary> {
        let current_run = Utc::now();
        let since = self
            .store
            .worker_state(WORKER_NAME)
            .await?
            .and_then(|w| w.last_run_at)
            .unwrap_or_else(|| current_run - Duration::hours(FIRST_RUN_WINDOW_HOURS));

        let listings = self.store.listings_since(since).await?;
        let filters = self.store.active_filters_with_users().await?;
        info!(
            listings = listings.len(),
            filters = filters.len(),
            since = %since,
            "Evaluating notification candidates"
        );

        let mut summary = NotifierSummary::default();
        let mut completed = true;

        'listings: for listing in &listings {
            for (filter, user) in &filters {
                if cancel::cancelled(&self.cancelled) {
                    info!("Cancelled, leaving the watermark for the next run");
                    completed = false;
                    break 'listings;
                }
                if !matches(listing, filter) {
                    continue;
                }
                // Dedup check before delivery AND before recording: the
                // first matching filter wins, later ones skip here.
                if self.store.notification_exists(user.id, listing.id).await? {
                    debug!(user = user.chat_id, listing = %listing.id, "Already notified");
                    continue;
                }

                match self.deliver(listing, user).await {
                    Delivery::Photo => {
                        summary.image_success += 1;
                        self.record(user, listing, Some(filter.id), &mut summary).await?;
                    }
                    Delivery::TextFallback => {
                        summary.image_fallback += 1;
                        self.record(user, listing, Some(filter.id), &mut summary).await?;
                    }
                    Delivery::TextOnly => {
                        summary.no_image += 1;
                        self.record(user, listing, Some(filter.id), &mut summary).await?;
                    }
                    Delivery::Deferred | Delivery::Failed => {
                        summary.failed += 1;
                    }
                }
            }
        }

        if completed {
            self.store
                .update_worker_state(WORKER_NAME, current_run, RunStatus::Ok, None)
                .await?;
        }

        Ok(summary)
    }

    /// Photo with caption when there is an image; text-only fallback only
    /// on non-retryable photo errors — a retryable failure is left for the
    /// next run rather than silently downgraded.
    async fn deliver(&self, listing: &Listing, user: &User) -> Delivery {
        let text = render_message(listing);

        if let Some(image_url) = &listing.image_url {
            match self
                .transport
                .send_photo(user.chat_id, image_url, &text)
                .await
            {
                Ok(()) => return Delivery::Photo,
                Err(e) if e.retryable => {
                    warn!(user = user.chat_id, listing = %listing.id, error = %e, "Photo send deferred");
                    return Delivery::Deferred;
                }
                Err(e) => {
                    debug!(
                        user = user.chat_id,
                        listing = %listing.id,
                        image_error = e.image_error,
                        error = %e,
                        "Photo rejected, falling back to text"
                    );
                    return match self.transport.send_text(user.chat_id, &text).await {
                        Ok(()) => Delivery::TextFallback,
                        Err(e) if e.retryable => Delivery::Deferred,
                        Err(e) => {
                            warn!(user = user.chat_id, error = %e, "Text fallback failed");
                            Delivery::Failed
                        }
                    };
                }
            }
        }

        match self.transport.send_text(user.chat_id, &text).await {
            Ok(()) => Delivery::TextOnly,
            Err(e) if e.retryable => {
                warn!(user = user.chat_id, listing = %listing.id, error = %e, "Send deferred");
                Delivery::Deferred
            }
            Err(e) => {
                warn!(user = user.chat_id, listing = %listing.id, error = %e, "Send failed");
                Delivery::Failed
            }
        }
    }

    async fn record(
        &self,
        user: &User,
        listing: &Listing,
        filter_id: Option<Uuid>,
        summary: &mut NotifierSummary,
    ) -> Result<()> {
        let recorded = self
            .store
            .record_notification(
                user.id,
                listing.id,
                filter_id,
                self.transport.channel(),
                Utc::now(),
            )
            .await?;
        if recorded {
            summary.sent += 1;
        } else {
            // A concurrent run beat us to the insert; the message went out
            // twice but the ledger stays single.
            debug!(user = user.chat_id, listing = %listing.id, "Delivery already recorded");
        }
        Ok(())
    }
}
