//! quotebook: a quote collection with category browsing, JSON interchange
//! and last-writer-wins sync against a remote posts endpoint.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod interchange;
pub mod models;
pub mod presentation;
pub mod prompt;
pub mod remote;
pub mod storage;
pub mod store;
pub mod sync;

pub use error::QuoteError;
pub use store::QuoteStore;
