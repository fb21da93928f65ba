//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::Notify;

use quotebook::ids::{FixedPicker, QuotePicker, SequentialIds};
use quotebook::models::*;
use quotebook::presentation::RecordingPresenter;
use quotebook::remote::{RemoteError, RemoteSource};
use quotebook::storage::{KeyValueStore, MemoryStore, QUOTES_KEY};
use quotebook::QuoteStore;

/// In-memory remote with switchable failures and an optional gate that
/// holds every fetch until notified.
#[derive(Default)]
pub struct FakeRemote {
    posts: Mutex<Vec<RemotePost>>,
    failure: Mutex<Option<u16>>,
    gate: Option<Arc<Notify>>,
    fetches: AtomicUsize,
    submitted: Mutex<Vec<NewPost>>,
}

impl FakeRemote {
    pub fn with_posts(posts: Vec<RemotePost>) -> Self {
        Self {
            posts: Mutex::new(posts),
            ..Default::default()
        }
    }

    pub fn failing(status: u16) -> Self {
        let remote = Self::default();
        remote.fail_with(Some(status));
        remote
    }

    pub fn gated(posts: Vec<RemotePost>, gate: Arc<Notify>) -> Self {
        Self {
            posts: Mutex::new(posts),
            gate: Some(gate),
            ..Default::default()
        }
    }

    pub fn set_posts(&self, posts: Vec<RemotePost>) {
        *self.posts.lock().unwrap() = posts;
    }

    pub fn fail_with(&self, status: Option<u16>) {
        *self.failure.lock().unwrap() = status;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<NewPost> {
        self.submitted.lock().unwrap().clone()
    }

    fn current_failure(&self) -> Option<RemoteError> {
        let failure = *self.failure.lock().unwrap();
        failure.map(|status| RemoteError::Status {
            status,
            body: "simulated".to_string(),
        })
    }
}

impl RemoteSource for FakeRemote {
    async fn fetch_candidates(&self) -> Result<Vec<RemotePost>, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(err) = self.current_failure() {
            return Err(err);
        }
        let posts = self.posts.lock().unwrap().clone();
        Ok(posts)
    }

    async fn submit(&self, post: &NewPost) -> Result<SubmitReceipt, RemoteError> {
        if let Some(err) = self.current_failure() {
            return Err(err);
        }
        self.submitted.lock().unwrap().push(post.clone());
        Ok(SubmitReceipt { id: 101 })
    }
}

/// Local store whose writes always fail.
#[derive(Clone, Default)]
pub struct ReadOnlyStore {
    inner: MemoryStore,
}

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        anyhow::bail!("disk full")
    }
}

/// A loaded store plus handles on everything it writes to.
pub struct Harness {
    pub store: QuoteStore,
    pub local: MemoryStore,
    pub session: MemoryStore,
    pub presenter: RecordingPresenter,
}

impl Harness {
    /// The collection as currently persisted.
    pub fn persisted(&self) -> Vec<Quote> {
        persisted(&self.local)
    }

    pub fn last_status(&self) -> String {
        self.presenter.last_status().expect("no status shown").0
    }
}

/// The collection as persisted in `local`.
pub fn persisted(local: &MemoryStore) -> Vec<Quote> {
    let blob = local.get(QUOTES_KEY).unwrap().expect("nothing persisted");
    serde_json::from_str(&blob).unwrap()
}

/// Store over the built-in defaults.
pub fn harness() -> Harness {
    build(MemoryStore::new(), FixedPicker(0))
}

/// Store whose local storage already holds `quotes`.
pub fn harness_with(quotes: &[Quote]) -> Harness {
    harness_with_picker(quotes, FixedPicker(0))
}

pub fn harness_with_picker(quotes: &[Quote], picker: impl QuotePicker + 'static) -> Harness {
    let local = MemoryStore::new();
    local
        .set(QUOTES_KEY, &serde_json::to_string(quotes).unwrap())
        .unwrap();
    build(local, picker)
}

/// Store over a local store that may already hold data.
pub fn build(local: MemoryStore, picker: impl QuotePicker + 'static) -> Harness {
    let session = MemoryStore::new();
    let presenter = RecordingPresenter::new();
    let store = QuoteStore::builder(local.clone(), session.clone(), presenter.clone())
        .id_generator(SequentialIds::default())
        .picker(picker)
        .load();

    Harness {
        store,
        local,
        session,
        presenter,
    }
}

pub fn post(id: u64, title: &str, user_id: u64) -> RemotePost {
    RemotePost {
        id,
        title: title.to_string(),
        body: String::new(),
        user_id,
    }
}

/// Five posts alternating between the two server categories.
pub fn five_posts() -> Vec<RemotePost> {
    (1..=5)
        .map(|i| post(i, &format!("remote quote {}", i), i))
        .collect()
}

pub fn sample_quotes() -> Vec<Quote> {
    vec![
        Quote::new("local-1", "A", "Work"),
        Quote::new("local-2", "B", "Life"),
        Quote::new("local-3", "C", "Work"),
        Quote::new("local-4", "D", "Humor"),
    ]
}
