use serde::{Deserialize, Serialize};

/// Counts produced by applying one batch of remote quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncReport {
    /// Existing entries whose content was replaced by the remote version.
    pub merged: usize,
    /// Entries appended because their id was not present locally.
    pub added: usize,
    /// Collection size after the pass.
    pub total: usize,
}

impl SyncReport {
    /// One-line summary: merges win over additions, additions over the total.
    pub fn summary(&self) -> String {
        if self.merged > 0 {
            format!("{} server updates merged.", self.merged)
        } else if self.added > 0 {
            format!("Added {} new quotes.", self.added)
        } else {
            format!("Total quotes: {}.", self.total)
        }
    }
}

/// How a reconciliation pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed(SyncReport),
    /// The pass aborted; local data was left as it was.
    Failed(String),
    /// Another pass was already in flight.
    Skipped,
}

impl SyncOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }

    /// Status line shown to the user for this outcome.
    pub fn message(&self) -> String {
        match self {
            Self::Completed(report) => {
                format!("Quotes synced with server! {}", report.summary())
            }
            Self::Failed(error) => format!("Sync failed. Using local data. Error: {}", error),
            Self::Skipped => "Sync already in progress.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prefers_merges() {
        let report = SyncReport { merged: 2, added: 3, total: 10 };
        assert_eq!(report.summary(), "2 server updates merged.");
    }

    #[test]
    fn test_summary_falls_back_to_additions_then_total() {
        let added = SyncReport { merged: 0, added: 3, total: 10 };
        assert_eq!(added.summary(), "Added 3 new quotes.");

        let idle = SyncReport { merged: 0, added: 0, total: 10 };
        assert_eq!(idle.summary(), "Total quotes: 10.");
    }

    #[test]
    fn test_outcome_messages() {
        let done = SyncOutcome::Completed(SyncReport { merged: 0, added: 5, total: 8 });
        assert_eq!(done.message(), "Quotes synced with server! Added 5 new quotes.");

        let failed = SyncOutcome::Failed("timeout".to_string());
        assert_eq!(
            failed.message(),
            "Sync failed. Using local data. Error: timeout"
        );
        assert!(failed.report().is_none());
    }
}
