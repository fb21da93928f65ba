use thiserror::Error;

use crate::remote::RemoteError;

/// Failures surfaced by quote store operations.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Input rejected before anything was changed.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Malformed JSON, either imported or read back from storage.
    #[error("{0}")]
    Parse(String),

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl QuoteError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}
