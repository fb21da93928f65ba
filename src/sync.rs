//! Background and on-demand synchronization.
//!
//! [`SyncService`] shares one [`QuoteStore`] between the periodic timer and
//! manual triggers. At most one pass is in flight: a trigger that arrives
//! while another pass is fetching returns [`SyncOutcome::Skipped`]. The store
//! lock is only held while applying results, never across the remote call,
//! so local edits can land while a fetch is outstanding.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;

use crate::error::QuoteError;
use crate::models::{NewPost, Quote, SyncOutcome};
use crate::remote::RemoteSource;
use crate::store::QuoteStore;

pub struct SyncService<R> {
    store: Arc<Mutex<QuoteStore>>,
    remote: R,
    in_flight: Mutex<()>,
}

impl<R: RemoteSource> SyncService<R> {
    pub fn new(store: QuoteStore, remote: R) -> Self {
        Self::from_shared(Arc::new(Mutex::new(store)), remote)
    }

    pub fn from_shared(store: Arc<Mutex<QuoteStore>>, remote: R) -> Self {
        Self {
            store,
            remote,
            in_flight: Mutex::new(()),
        }
    }

    pub fn store(&self) -> Arc<Mutex<QuoteStore>> {
        Arc::clone(&self.store)
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn is_syncing(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Run one pass unless one is already running.
    pub async fn sync_now(&self) -> SyncOutcome {
        let Ok(_pass) = self.in_flight.try_lock() else {
            tracing::debug!("Sync already in flight, skipping trigger");
            return SyncOutcome::Skipped;
        };

        self.store.lock().await.begin_sync();
        let fetched = self.remote.fetch_candidates().await;
        self.store.lock().await.finish_sync(fetched)
    }

    /// Add a quote locally, then submit it without holding the store.
    pub async fn add_quote(&self, text: &str, category: &str) -> Result<Quote, QuoteError> {
        let quote = {
            let mut store = self.store.lock().await;
            let quote = store.add_quote(text, category)?;
            store.notify("Quote added locally. Attempting to post to server...", false);
            quote
        };

        let result = self.remote.submit(&NewPost::from_quote(&quote)).await;
        self.store.lock().await.report_submission(&result);
        Ok(quote)
    }

    /// Sync immediately, then every `every`, until `shutdown` turns true or
    /// its sender is dropped. Ticks missed during a slow pass are skipped.
    pub async fn run_periodic(
        &self,
        every: Duration,
        mut shutdown: watch::Receiver<bool>,
        mut on_outcome: impl FnMut(&SyncOutcome),
    ) {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!("Periodic sync every {:?}", every);
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = self.sync_now().await;
                    on_outcome(&outcome);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("Periodic sync stopped");
    }
}
