//! Remote source port.
//!
//! Reconciliation only needs two calls from the remote side: list the
//! candidate posts, and accept a new one. [`PostsClient`] speaks HTTP to a
//! JSONPlaceholder-compatible endpoint; tests plug in their own sources.

mod client;

use std::future::Future;

pub use client::*;

use crate::models::{NewPost, RemotePost, SubmitReceipt};

pub trait RemoteSource: Send + Sync {
    /// Fetch the records to reconcile against.
    fn fetch_candidates(&self) -> impl Future<Output = Result<Vec<RemotePost>, RemoteError>> + Send;

    /// Forward a locally created record.
    fn submit(&self, post: &NewPost) -> impl Future<Output = Result<SubmitReceipt, RemoteError>> + Send;
}
