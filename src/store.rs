//! The quote store.
//!
//! [`QuoteStore`] owns the collection and every port it talks to. All
//! mutations persist immediately and re-render the category options, so the
//! durable copy never lags the in-memory one by more than a failed write.
//!
//! # Reconciliation
//!
//! A sync pass fetches the remote candidates, maps each to a [`Quote`], and
//! applies them with remote precedence: an entry with the same id is
//! overwritten in place, anything else is appended. The collection never
//! shrinks and ids never change.

use std::collections::{BTreeSet, HashSet};

use crate::error::QuoteError;
use crate::ids::{ClockIds, IdGenerator, QuotePicker, RandomPicker};
use crate::interchange;
use crate::models::*;
use crate::presentation::{Presenter, Status};
use crate::remote::{RemoteError, RemoteSource};
use crate::storage::{KeyValueStore, FILTER_KEY, LAST_VIEWED_KEY, QUOTES_KEY};

pub struct QuoteStore {
    quotes: Vec<Quote>,
    filter: String,
    local: Box<dyn KeyValueStore>,
    session: Box<dyn KeyValueStore>,
    presenter: Box<dyn Presenter>,
    ids: Box<dyn IdGenerator>,
    picker: Box<dyn QuotePicker>,
}

/// Collects the ports before the initial load.
pub struct QuoteStoreBuilder {
    local: Box<dyn KeyValueStore>,
    session: Box<dyn KeyValueStore>,
    presenter: Box<dyn Presenter>,
    ids: Box<dyn IdGenerator>,
    picker: Box<dyn QuotePicker>,
}

impl QuoteStoreBuilder {
    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn picker(mut self, picker: impl QuotePicker + 'static) -> Self {
        self.picker = Box::new(picker);
        self
    }

    /// Read the persisted collection and filter, then render the options.
    pub fn load(self) -> QuoteStore {
        let mut store = QuoteStore {
            quotes: Vec::new(),
            filter: ALL_CATEGORIES.to_string(),
            local: self.local,
            session: self.session,
            presenter: self.presenter,
            ids: self.ids,
            picker: self.picker,
        };

        store.quotes = store.read_persisted_quotes();
        if store.assign_missing_ids() {
            if let Err(e) = store.persist() {
                tracing::warn!("Failed to save re-keyed quotes: {}", e);
            }
        }
        store.restore_filter();
        store.render_categories();

        tracing::debug!(
            "Loaded {} quotes, filter '{}'",
            store.quotes.len(),
            store.filter
        );
        store
    }
}

impl QuoteStore {
    /// Start building a store over the durable store, the session store and
    /// a presenter. Ids come from the clock and selection is random unless
    /// overridden.
    pub fn builder(
        local: impl KeyValueStore + 'static,
        session: impl KeyValueStore + 'static,
        presenter: impl Presenter + 'static,
    ) -> QuoteStoreBuilder {
        QuoteStoreBuilder {
            local: Box::new(local),
            session: Box::new(session),
            presenter: Box::new(presenter),
            ids: Box::new(ClockIds::default()),
            picker: Box::new(RandomPicker::new()),
        }
    }

    // ============================================================
    // Accessors
    // ============================================================

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.id == id)
    }

    /// The current category filter, `"all"` or a category.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Distinct non-empty categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.quotes
            .iter()
            .map(|q| q.category.as_str())
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Filter options: the "all" sentinel followed by [`Self::categories`].
    pub fn category_options(&self) -> Vec<String> {
        std::iter::once(ALL_CATEGORIES.to_string())
            .chain(self.categories())
            .collect()
    }

    /// Quotes matching a filter value.
    pub fn matching(&self, category: &str) -> Vec<&Quote> {
        self.quotes
            .iter()
            .filter(|q| in_category(q, category))
            .collect()
    }

    /// The quote last shown in this session.
    pub fn last_viewed(&self) -> Option<Quote> {
        let blob = match self.session.get(LAST_VIEWED_KEY) {
            Ok(blob) => blob?,
            Err(e) => {
                tracing::warn!("Failed to read last viewed quote: {}", e);
                return None;
            }
        };
        serde_json::from_str(&blob).ok()
    }

    /// The status message the presenter still shows, if any.
    pub fn status(&self) -> Option<Status> {
        self.presenter.status()
    }

    /// Forward a message to the presenter.
    pub fn notify(&mut self, message: &str, success: bool) {
        self.presenter.show_status(message, success);
    }

    // ============================================================
    // Selection
    // ============================================================

    /// Pick one quote uniformly from `category` (or everything for `"all"`).
    ///
    /// The filter is remembered even when nothing matches. An empty match is
    /// rendered as such and returns `None`.
    pub fn filter_and_pick(&mut self, category: &str) -> Option<Quote> {
        self.filter = category.to_string();
        if let Err(e) = self.local.set(FILTER_KEY, category) {
            tracing::warn!("Failed to save filter: {}", e);
        }

        let candidates: Vec<&Quote> = self
            .quotes
            .iter()
            .filter(|q| in_category(q, category))
            .collect();
        if candidates.is_empty() {
            self.presenter.render_empty(category);
            return None;
        }

        let index = self.picker.pick(candidates.len());
        let quote = candidates[index].clone();

        self.presenter.render_quote(&quote);
        match serde_json::to_string(&quote) {
            Ok(blob) => {
                if let Err(e) = self.session.set(LAST_VIEWED_KEY, &blob) {
                    tracing::warn!("Failed to save last viewed quote: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize last viewed quote: {}", e),
        }

        Some(quote)
    }

    /// Pick again using the current filter.
    pub fn show_random(&mut self) -> Option<Quote> {
        let filter = self.filter.clone();
        self.filter_and_pick(&filter)
    }

    // ============================================================
    // Adding
    // ============================================================

    /// Append a new local quote.
    ///
    /// Both fields are trimmed and must be non-empty. If the collection
    /// cannot be saved the append is undone.
    pub fn add_quote(&mut self, text: &str, category: &str) -> Result<Quote, QuoteError> {
        let text = text.trim();
        let category = category.trim();
        if text.is_empty() || category.is_empty() {
            return Err(QuoteError::Validation(
                "Please enter both quote text and a category.".to_string(),
            ));
        }

        let quote = Quote::new(self.fresh_id(), text, category);
        self.quotes.push(quote.clone());

        if let Err(e) = self.persist() {
            self.quotes.pop();
            tracing::error!("Failed to save new quote: {}", e);
            return Err(e);
        }

        tracing::info!("Added quote {} in '{}'", quote.id, quote.category);
        self.render_categories();
        self.presenter.show_status("Quote added locally.", true);
        Ok(quote)
    }

    /// Add locally, then forward the quote to the remote.
    ///
    /// A failed submission only produces a warning status. The local quote
    /// stays and will be offered again on the next manual sync.
    pub async fn add_and_submit<R: RemoteSource>(
        &mut self,
        remote: &R,
        text: &str,
        category: &str,
    ) -> Result<Quote, QuoteError> {
        let quote = self.add_quote(text, category)?;
        self.presenter
            .show_status("Quote added locally. Attempting to post to server...", false);

        let result = remote.submit(&NewPost::from_quote(&quote)).await;
        self.report_submission(&result);
        Ok(quote)
    }

    /// Turn a submission result into status messages. Returns whether it succeeded.
    pub fn report_submission(&mut self, result: &Result<SubmitReceipt, RemoteError>) -> bool {
        match result {
            Ok(receipt) => {
                self.presenter.show_status(
                    &format!(
                        "Quote posted to server successfully! (Mock ID: {})",
                        receipt.id
                    ),
                    true,
                );
                true
            }
            Err(e) => {
                tracing::warn!("Post failed: {}", e);
                self.presenter
                    .show_status(&format!("Error posting quote: {}", e), false);
                self.presenter
                    .show_status("Post failed. Please try 'Sync Now' later.", false);
                false
            }
        }
    }

    // ============================================================
    // Import / export
    // ============================================================

    /// Append the valid entries of a JSON array. Returns how many were added.
    ///
    /// Entries keep their id when it is present and unused; otherwise they
    /// get a fresh local one.
    pub fn import_json(&mut self, json: &str) -> Result<usize, QuoteError> {
        let incoming = match interchange::parse_import(json) {
            Ok(incoming) => incoming,
            Err(e) => {
                tracing::warn!("Import failed: {}", e);
                self.presenter
                    .show_status(&format!("Import failed: {}", e), false);
                return Err(e);
            }
        };

        let before = self.quotes.len();
        let mut taken: HashSet<String> = self.quotes.iter().map(|q| q.id.clone()).collect();
        for mut quote in incoming {
            if quote.id.is_empty() || taken.contains(&quote.id) {
                quote.id = self.fresh_unused_id(&taken);
            }
            taken.insert(quote.id.clone());
            self.quotes.push(quote);
        }

        if let Err(e) = self.persist() {
            self.quotes.truncate(before);
            self.presenter
                .show_status(&format!("Import failed: {}", e), false);
            return Err(e);
        }

        let added = self.quotes.len() - before;
        tracing::info!("Imported {} quotes", added);
        self.render_categories();
        self.presenter
            .show_status(&format!("Successfully imported {} quotes!", added), true);
        Ok(added)
    }

    /// The whole collection as a pretty-printed JSON array.
    pub fn export_json(&self) -> Result<String, QuoteError> {
        interchange::export_json(&self.quotes)
    }

    // ============================================================
    // Reconciliation
    // ============================================================

    /// Fetch from `remote` and apply the result. Never fails: errors become
    /// a [`SyncOutcome::Failed`] and leave the collection untouched.
    pub async fn reconcile<R: RemoteSource>(&mut self, remote: &R) -> SyncOutcome {
        self.begin_sync();
        let fetched = remote.fetch_candidates().await;
        self.finish_sync(fetched)
    }

    /// Announce a pass that is about to fetch.
    pub fn begin_sync(&mut self) {
        self.presenter
            .show_status("Syncing quotes with server...", false);
    }

    /// Apply a fetch result: merge, persist, re-render and report.
    pub fn finish_sync(&mut self, fetched: Result<Vec<RemotePost>, RemoteError>) -> SyncOutcome {
        let posts = match fetched {
            Ok(posts) => posts,
            Err(e) => {
                tracing::error!("Data sync error: {}", e);
                return self.report_sync(SyncOutcome::Failed(e.to_string()));
            }
        };

        let incoming = posts.iter().map(Quote::from_remote).collect();
        let snapshot = self.quotes.clone();
        let report = self.apply_remote(incoming);

        if let Err(e) = self.persist() {
            tracing::error!("Failed to save synced quotes: {}", e);
            self.quotes = snapshot;
            return self.report_sync(SyncOutcome::Failed(e.to_string()));
        }

        self.render_categories();
        if self.filter != ALL_CATEGORIES && !self.categories().contains(&self.filter) {
            self.filter = ALL_CATEGORIES.to_string();
        }
        self.show_random();

        tracing::info!(
            "Sync complete: {} merged, {} added, {} total",
            report.merged,
            report.added,
            report.total
        );
        self.report_sync(SyncOutcome::Completed(report))
    }

    /// Apply remote quotes with remote precedence. Does not persist.
    ///
    /// A matching id is overwritten in place and counts as a merge only if
    /// its content changed, so re-applying the same list reports nothing.
    pub fn apply_remote(&mut self, incoming: Vec<Quote>) -> SyncReport {
        let before = self.quotes.len();
        let mut merged = 0;

        for remote in incoming {
            match self.quotes.iter_mut().find(|q| q.id == remote.id) {
                Some(existing) => {
                    if !existing.same_content(&remote) {
                        existing.text = remote.text;
                        existing.category = remote.category;
                        merged += 1;
                    }
                }
                None => self.quotes.push(remote),
            }
        }

        SyncReport {
            merged,
            added: self.quotes.len() - before,
            total: self.quotes.len(),
        }
    }

    fn report_sync(&mut self, outcome: SyncOutcome) -> SyncOutcome {
        self.presenter
            .show_status(&outcome.message(), outcome.is_completed());
        outcome
    }

    // ============================================================
    // Internals
    // ============================================================

    fn persist(&self) -> Result<(), QuoteError> {
        let blob = serde_json::to_string(&self.quotes)
            .map_err(|e| QuoteError::Parse(format!("Failed to serialize quotes: {}", e)))?;
        self.local.set(QUOTES_KEY, &blob)?;
        Ok(())
    }

    fn read_persisted_quotes(&self) -> Vec<Quote> {
        match self.local.get(QUOTES_KEY) {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<Quote>>(&blob) {
                Ok(quotes) => quotes,
                Err(e) => {
                    tracing::warn!("Stored quotes are unreadable, using defaults: {}", e);
                    default_quotes()
                }
            },
            Ok(None) => default_quotes(),
            Err(e) => {
                tracing::warn!("Failed to read stored quotes, using defaults: {}", e);
                default_quotes()
            }
        }
    }

    /// Give id-less or duplicate-id entries a fresh id. Returns whether anything changed.
    fn assign_missing_ids(&mut self) -> bool {
        let mut seen = HashSet::new();
        let mut changed = false;
        let mut taken: HashSet<String> = self.quotes.iter().map(|q| q.id.clone()).collect();

        for i in 0..self.quotes.len() {
            let id = self.quotes[i].id.clone();
            if id.is_empty() || !seen.insert(id) {
                let fresh = self.fresh_unused_id(&taken);
                taken.insert(fresh.clone());
                seen.insert(fresh.clone());
                self.quotes[i].id = fresh;
                changed = true;
            }
        }
        changed
    }

    fn restore_filter(&mut self) {
        let saved = match self.local.get(FILTER_KEY) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!("Failed to read saved filter: {}", e);
                None
            }
        };

        if let Some(saved) = saved {
            if saved == ALL_CATEGORIES || self.categories().contains(&saved) {
                self.filter = saved;
            }
        }
    }

    fn render_categories(&mut self) {
        let options = self.category_options();
        self.presenter.render_category_options(&options);
    }

    fn fresh_id(&mut self) -> String {
        let taken: HashSet<String> = self.quotes.iter().map(|q| q.id.clone()).collect();
        self.fresh_unused_id(&taken)
    }

    fn fresh_unused_id(&mut self, taken: &HashSet<String>) -> String {
        loop {
            let id = self.ids.next_id();
            if !taken.contains(&id) {
                return id;
            }
        }
    }
}

fn in_category(quote: &Quote, category: &str) -> bool {
    category == ALL_CATEGORIES || quote.category == category
}
