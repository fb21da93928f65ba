//! Domain models for quotebook.
//!
//! # Core Concepts
//!
//! - [`Quote`]: The only entity. A text/category pair with an id whose prefix
//!   records provenance (`local-` or `server-`).
//! - [`RemotePost`]: A record as served by the remote posts endpoint. Each one
//!   maps to exactly one quote via [`Quote::from_remote`].
//! - [`SyncReport`] / [`SyncOutcome`]: The result of one reconciliation pass.

mod outcome;
mod post;
mod quote;

pub use outcome::*;
pub use post::*;
pub use quote::*;
